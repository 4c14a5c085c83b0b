//! # 隐写错误类型
//!
//! 核心编解码器只会产生两类错误：容量不足与未找到终止标记。
//! 两者都只影响单次调用，调用方可据此决定如何向用户报告。

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// 消息加终止标记所需的比特数超过了图像可用的通道数。
    InsufficientCapacity { required: usize, available: usize },

    /// 扫描完整幅图像仍未遇到终止标记。
    NoMarkerFound,
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StegoError::InsufficientCapacity {
                required,
                available,
            } => write!(
                f,
                "insufficient capacity: {required} bits required, {available} bits available"
            ),
            StegoError::NoMarkerFound => write!(f, "no hidden message found"),
        }
    }
}

impl std::error::Error for StegoError {}
