//! # LSB 嵌入与提取模块
//!
//! 按行优先顺序遍历像素 (先遍历一行中的所有 x，再前进到下一行)，
//! 每个像素按 R、G、B 顺序访问通道，每个通道的最低位存储 1 bit。
//!
//! 结果图像必须以无损格式保存 (如 PNG、BMP)；JPEG 等有损格式会重新压缩像素，
//! 破坏已写入的最低位。

use crate::bitstream::{decode_bits, encode_bits, required_bits};
use crate::constants::{BITS_PER_BYTE, CHANNELS_PER_PIXEL, END_MARKER};
use crate::error::StegoError;
use image::RgbImage;

/// [`embed_bits`] 的结果：全部写入，或因容量不足只写入了前缀。
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedOutcome {
    Complete {
        bits_written: usize,
    },
    Truncated {
        bits_written: usize,
        bits_required: usize,
    },
}

impl EmbedOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, EmbedOutcome::Complete { .. })
    }

    pub fn bits_written(&self) -> usize {
        match *self {
            EmbedOutcome::Complete { bits_written } => bits_written,
            EmbedOutcome::Truncated { bits_written, .. } => bits_written,
        }
    }
}

/// 图像可承载的比特数，即 `width * height * 3`。
pub fn capacity_bits(grid: &RgbImage) -> usize {
    let (width, height) = grid.dimensions();
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(CHANNELS_PER_PIXEL)
}

/// 图像可完整隐藏的最长消息字节数 (已扣除终止标记)。
pub fn max_message_len(grid: &RgbImage) -> usize {
    (capacity_bits(grid) / BITS_PER_BYTE).saturating_sub(END_MARKER.len())
}

/// 检查图像能否完整容纳 `message_len` 字节的消息及其终止标记。
pub fn check_capacity(grid: &RgbImage, message_len: usize) -> Result<(), StegoError> {
    let required = required_bits(message_len);
    let available = capacity_bits(grid);

    if required > available {
        return Err(StegoError::InsufficientCapacity {
            required,
            available,
        });
    }

    Ok(())
}

/// 将比特序列依次写入各通道的最低位。
///
/// 比特写完后立即停止扫描，其余像素保持原样。
/// 图像容量不足时只写入前缀，并返回 [`EmbedOutcome::Truncated`]。
pub fn embed_bits(grid: &mut RgbImage, bits: &[u8]) -> EmbedOutcome {
    let channels = grid.pixels_mut().flat_map(|pixel| pixel.0.iter_mut());

    let mut bits_written = 0;
    for (&bit, channel) in bits.iter().zip(channels) {
        *channel = (*channel & 0xFE) | (bit & 1);
        bits_written += 1;
    }

    log::debug!("Embedded {} of {} bits", bits_written, bits.len());

    if bits_written < bits.len() {
        EmbedOutcome::Truncated {
            bits_written,
            bits_required: bits.len(),
        }
    } else {
        EmbedOutcome::Complete { bits_written }
    }
}

/// 按嵌入时相同的顺序惰性地读出每个通道的最低位。
///
/// 每次调用都从第一个像素重新开始。
pub fn extract_bits(grid: &RgbImage) -> impl Iterator<Item = u8> + '_ {
    grid.pixels()
        .flat_map(|pixel| pixel.0.iter().map(|channel| channel & 1))
}

/// 将消息 (追加终止标记后) 隐藏到图像中。
///
/// 与 [`hide_checked`] 不同，容量不足时不会报错，而是截断写入，
/// 调用方需检查返回的 [`EmbedOutcome`]。
pub fn hide(grid: &mut RgbImage, message: &[u8]) -> EmbedOutcome {
    let bits = encode_bits(message);
    let outcome = embed_bits(grid, &bits);

    if let EmbedOutcome::Truncated {
        bits_written,
        bits_required,
    } = outcome
    {
        log::warn!(
            "Message truncated: only {} of {} bits fit into the image",
            bits_written,
            bits_required
        );
    }

    outcome
}

/// 先检查容量再隐藏消息；容量不足时返回错误且不修改图像。
pub fn hide_checked(grid: &mut RgbImage, message: &[u8]) -> Result<EmbedOutcome, StegoError> {
    check_capacity(grid, message.len())?;
    Ok(hide(grid, message))
}

/// 从图像中恢复隐藏的消息。
///
/// 提取与解码交替进行，遇到终止标记立即停止扫描。
/// 扫描完整幅图像仍未找到终止标记时返回 [`StegoError::NoMarkerFound`]。
pub fn reveal(grid: &RgbImage) -> Result<Vec<u8>, StegoError> {
    decode_bits(extract_bits(grid)).ok_or(StegoError::NoMarkerFound)
}
