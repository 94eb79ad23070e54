/// Buffer decode command.
pub mod decode;
/// Type graph inspection command.
pub mod types;
