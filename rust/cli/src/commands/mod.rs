mod play;
mod replay;
mod verify;

pub use play::handle_play_command;
pub use replay::handle_replay_command;
pub use verify::handle_verify_command;
