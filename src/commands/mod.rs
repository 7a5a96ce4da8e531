mod unpack_cmd;

pub use unpack_cmd::handle_unpack;
