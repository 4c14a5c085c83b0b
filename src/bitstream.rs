//! # 比特流编解码模块
//!
//! 负责消息字节与比特序列之间的互相转换。
//! 编码时在消息末尾追加 [`END_MARKER`]，解码时逐字节累积，
//! 一旦输出以终止标记结尾就立即停止，不再读取后续比特。

use crate::constants::{BITS_PER_BYTE, END_MARKER};

/// 隐藏 `message_len` 字节的消息 (含终止标记) 所需的比特数。
pub fn required_bits(message_len: usize) -> usize {
    message_len
        .saturating_add(END_MARKER.len())
        .saturating_mul(BITS_PER_BYTE)
}

/// 将消息转换为比特序列 (每个元素为 0 或 1)。
///
/// 消息后追加终止标记，每个字节按最高位优先展开，按顺序拼接。
pub fn encode_bits(message: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(required_bits(message.len()));
    bits.extend(
        message
            .iter()
            .chain(END_MARKER)
            .flat_map(|&byte| (0..BITS_PER_BYTE).rev().map(move |i| (byte >> i) & 1)),
    );
    bits
}

/// [`MarkerDecoder::push_bit`] 每消费一个比特后的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeProgress {
    /// 尚未遇到终止标记，需要更多比特。
    Accumulating,
    /// 刚完成的字节使输出以终止标记结尾。
    MarkerFound,
}

/// 增量解码器：每 8 个比特组成一个字节，并在每个字节完成后检查终止标记。
#[derive(Debug, Default)]
pub struct MarkerDecoder {
    current: u8,
    filled: usize,
    consumed: usize,
    output: Vec<u8>,
    found: bool,
}

impl MarkerDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 消费一个比特 (只使用最低位)。
    ///
    /// 找到终止标记后再调用不会改变输出。
    pub fn push_bit(&mut self, bit: u8) -> DecodeProgress {
        if self.found {
            return DecodeProgress::MarkerFound;
        }

        self.consumed += 1;
        self.current = (self.current << 1) | (bit & 1);
        self.filled += 1;

        if self.filled < BITS_PER_BYTE {
            return DecodeProgress::Accumulating;
        }

        self.output.push(self.current);
        self.current = 0;
        self.filled = 0;

        if self.output.ends_with(END_MARKER) {
            self.found = true;
            DecodeProgress::MarkerFound
        } else {
            DecodeProgress::Accumulating
        }
    }

    /// 目前为止消费的比特数。
    pub fn bits_consumed(&self) -> usize {
        self.consumed
    }

    pub fn is_found(&self) -> bool {
        self.found
    }

    /// 去掉终止标记后的消息；如果从未遇到终止标记 (输入耗尽) 则返回 `None`。
    pub fn into_message(mut self) -> Option<Vec<u8>> {
        if !self.found {
            return None;
        }
        self.output.truncate(self.output.len() - END_MARKER.len());
        Some(self.output)
    }
}

/// 从比特序列中解码消息。
///
/// 一旦遇到终止标记就立即返回，不会再从 `bits` 中拉取任何比特。
/// 比特耗尽仍未找到终止标记时返回 `None`，与成功解码出的空消息 `Some(vec![])` 区分开。
pub fn decode_bits<I>(bits: I) -> Option<Vec<u8>>
where
    I: IntoIterator<Item = u8>,
{
    let mut decoder = MarkerDecoder::new();

    for bit in bits {
        if decoder.push_bit(bit) == DecodeProgress::MarkerFound {
            log::trace!("End marker found after {} bits", decoder.bits_consumed());
            return decoder.into_message();
        }
    }

    log::debug!(
        "Bit source exhausted after {} bits without an end marker",
        decoder.bits_consumed()
    );
    None
}
