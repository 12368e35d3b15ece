//! Fuzz target: console line parser
//!
//! Feeds arbitrary UTF-8 lines to `parse_line` and checks that:
//! - No panics under any input
//! - Every accepted room command names one of the two rooms
//!
//! cargo fuzz run fuzz_console_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use roomvent::adapters::console::{ConsoleInput, parse_line};
use roomvent::app::commands::AppCommand;
use roomvent::control::RoomId;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(ConsoleInput::Command(
        AppCommand::Open(room) | AppCommand::Close(room) | AppCommand::ToggleAutoMode(room),
    )) = parse_line(line)
    {
        assert!(RoomId::ALL.contains(&room));
    }
});
