//! Command Tests
//!
//! Tests for decoding raw command strings into typed commands.

use gdbmock::protocol::{Command, MAX_READ_LENGTH};
use gdbmock::MockError;

fn assert_decode_error(packet: &str) {
    match Command::parse(packet) {
        Err(MockError::Decode(_)) => {}
        other => panic!("Expected decode error for {:?}, got {:?}", packet, other),
    }
}

// =============================================================================
// Register Commands
// =============================================================================

#[test]
fn test_parse_read_registers() {
    assert_eq!(Command::parse("g").unwrap(), Command::ReadRegisters);
}

#[test]
fn test_parse_write_registers() {
    assert_eq!(
        Command::parse("G0011aabb").unwrap(),
        Command::WriteRegisters { data: "0011aabb" }
    );
}

#[test]
fn test_parse_read_register() {
    assert_eq!(
        Command::parse("p1f").unwrap(),
        Command::ReadRegister { register: 0x1f }
    );
}

#[test]
fn test_parse_write_register() {
    assert_eq!(
        Command::parse("P10=deadbeef").unwrap(),
        Command::WriteRegister {
            register: 0x10,
            value: "deadbeef"
        }
    );
}

#[test]
fn test_register_number_must_be_hex() {
    assert_decode_error("pxyz");
    assert_decode_error("p");
    assert_decode_error("Pq=00");
    assert_decode_error("P10");
}

// =============================================================================
// Memory Commands
// =============================================================================

#[test]
fn test_parse_read_memory() {
    assert_eq!(
        Command::parse("m1000,4").unwrap(),
        Command::ReadMemory {
            addr: 0x1000,
            length: 4
        }
    );
}

#[test]
fn test_parse_read_memory_at_length_limit() {
    let packet = format!("m0,{:x}", MAX_READ_LENGTH);
    assert_eq!(
        Command::parse(&packet).unwrap(),
        Command::ReadMemory {
            addr: 0,
            length: MAX_READ_LENGTH
        }
    );
}

#[test]
fn test_parse_read_memory_oversized_length() {
    assert_decode_error(&format!("m0,{:x}", MAX_READ_LENGTH + 1));
    assert_decode_error("m0,4000000000000");
    assert_decode_error("m0,ffffffffffffffff");
}

#[test]
fn test_parse_read_memory_uppercase_hex() {
    assert_eq!(
        Command::parse("mFFFF0000,1A").unwrap(),
        Command::ReadMemory {
            addr: 0xffff_0000,
            length: 0x1a
        }
    );
}

#[test]
fn test_parse_write_memory() {
    assert_eq!(
        Command::parse("M1000,2:abcd").unwrap(),
        Command::WriteMemory {
            addr: 0x1000,
            length: 2,
            data: "abcd"
        }
    );
}

#[test]
fn test_malformed_memory_commands() {
    assert_decode_error("m1000");
    assert_decode_error("m1000,4,5");
    assert_decode_error("mzz,4");
    assert_decode_error("M1000,2");
    assert_decode_error("M1000:abcd");
}

// =============================================================================
// Query Commands
// =============================================================================

#[test]
fn test_parse_qsymbol() {
    assert_eq!(
        Command::parse("qSymbol::").unwrap(),
        Command::Symbol { args: ":" }
    );
    assert_eq!(Command::parse("qSymbol").unwrap(), Command::Symbol { args: "" });
}

#[test]
fn test_parse_qsupported() {
    assert_eq!(
        Command::parse("qSupported:xmlRegisters=i386;qRelocInsn+").unwrap(),
        Command::Supported {
            features: vec!["xmlRegisters=i386", "qRelocInsn+"]
        }
    );
    assert_eq!(
        Command::parse("qSupported").unwrap(),
        Command::Supported { features: vec![] }
    );
}

#[test]
fn test_parse_thread_queries() {
    assert_eq!(Command::parse("qfThreadInfo").unwrap(), Command::ThreadInfoFirst);
    assert_eq!(Command::parse("qC").unwrap(), Command::CurrentThread);
    assert_eq!(Command::parse("?").unwrap(), Command::HaltReason);
}

#[test]
fn test_parse_select_thread() {
    assert_eq!(
        Command::parse("Hg1a").unwrap(),
        Command::SelectThread {
            op: 'g',
            thread_id: 0x1a
        }
    );
    assert_eq!(
        Command::parse("Hc-1").unwrap(),
        Command::SelectThread {
            op: 'c',
            thread_id: -1
        }
    );
}

#[test]
fn test_malformed_select_thread() {
    assert_decode_error("H");
    assert_decode_error("Hg");
    assert_decode_error("Hgxyz");
}

// =============================================================================
// qXfer
// =============================================================================

#[test]
fn test_parse_xfer() {
    assert_eq!(
        Command::parse("qXfer:features:read:target.xml:0,fff").unwrap(),
        Command::Xfer {
            object: "features",
            mode: "read",
            annex: "target.xml",
            offset: 0,
            length: 0xfff
        }
    );
}

#[test]
fn test_xfer_requires_four_fields() {
    assert_decode_error("qXfer:features:read:0,fff");
    assert_decode_error("qXfer:features:read:a:b:0,fff");
    assert_decode_error("qXfer:features:read:target.xml:0");
}

// =============================================================================
// Fallthrough
// =============================================================================

#[test]
fn test_unknown_commands_are_other() {
    assert_eq!(Command::parse("vCont?").unwrap(), Command::Other("vCont?"));
    assert_eq!(
        Command::parse("QThreadSuffixSupported").unwrap(),
        Command::Other("QThreadSuffixSupported")
    );
    assert_eq!(Command::parse("").unwrap(), Command::Other(""));
}

#[test]
fn test_command_names() {
    assert_eq!(Command::parse("?").unwrap().name(), "halt_reason");
    assert_eq!(Command::parse("vCont?").unwrap().name(), "other");
}
