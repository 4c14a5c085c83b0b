/// 附加在每条消息末尾的终止标记。
/// 提取时一旦解码出的字节流以该标记结尾，即视为消息结束；不存储长度前缀。
pub const END_MARKER: &[u8] = b"|||END|||";

/// 每个字节包含的比特数，按最高位优先 (MSB first) 写入。
pub const BITS_PER_BYTE: usize = 8;

/// 每个像素参与隐写的颜色通道数 (R, G, B)，每个通道的最低位存储 1 bit。
pub const CHANNELS_PER_PIXEL: usize = 3;

/// 终止标记本身占用的比特数 (9 字节 = 72 bits)。
pub const END_MARKER_BITS: usize = END_MARKER.len() * BITS_PER_BYTE;
