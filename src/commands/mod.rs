pub type CmdResult<T> = skeleton::Result<(T, i32)>;

pub mod new;
