//! # lsb_marker 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：消息追加终止标记 `|||END|||` 后按最高位优先展开为比特，
//! 依次写入 RGB 像素各通道的最低位；恢复时按相同顺序读取，遇到终止标记即停止。

// 声明库包含的所有模块。

pub mod bitstream;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod steganography;

pub use error::StegoError;
pub use steganography::{EmbedOutcome, check_capacity, hide, hide_checked, reveal};
