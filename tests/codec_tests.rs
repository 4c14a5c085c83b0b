use image::{Rgb, RgbImage};
use lsb_marker::{
    EmbedOutcome, StegoError,
    bitstream::{DecodeProgress, MarkerDecoder, decode_bits, encode_bits, required_bits},
    check_capacity,
    constants::END_MARKER_BITS,
    hide, hide_checked, reveal,
    steganography::{capacity_bits, embed_bits, extract_bits, max_message_len},
};
use rand::{Rng, RngCore};
use std::cell::Cell;

/// 一个辅助函数，用于创建带有随机像素的 RGB 像素网格
fn random_grid(width: u32, height: u32) -> RgbImage {
    let mut raw = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw);
    RgbImage::from_raw(width, height, raw).expect("Buffer size matches dimensions.")
}

/// 验证比特序列按最高位优先展开，并附带终止标记
#[test]
fn test_encode_bits_is_msb_first_with_marker() {
    let bits = encode_bits(b"A");

    assert_eq!(bits.len(), required_bits(1));
    assert_eq!(bits.len(), 80);
    // 'A' = 0x41 = 0b0100_0001
    assert_eq!(&bits[..8], &[0, 1, 0, 0, 0, 0, 0, 1]);
    // '|' = 0x7C = 0b0111_1100
    assert_eq!(&bits[8..16], &[0, 1, 1, 1, 1, 1, 0, 0]);
}

/// 验证比特序列可以还原出原始消息
#[test]
fn test_decode_bits_recovers_message() {
    let message = b"hello, world";
    let decoded = decode_bits(encode_bits(message));

    assert_eq!(decoded.as_deref(), Some(&message[..]));
}

/// 验证解码器在终止标记出现后不再拉取任何比特
#[test]
fn test_decode_stops_at_marker() {
    let mut bits = encode_bits(b"Hi");
    let expected = bits.len();
    bits.extend(std::iter::repeat_n(1u8, 1000));

    let pulled = Cell::new(0usize);
    let decoded = decode_bits(bits.into_iter().inspect(|_| pulled.set(pulled.get() + 1)));

    assert_eq!(decoded.as_deref(), Some(&b"Hi"[..]));
    assert_eq!(pulled.get(), expected, "Decoder must stop right after the marker.");
}

/// 验证状态机逐比特的状态转换
#[test]
fn test_marker_decoder_state_machine() {
    let mut decoder = MarkerDecoder::new();

    for (i, bit) in encode_bits(b"").into_iter().enumerate() {
        let progress = decoder.push_bit(bit);
        if i + 1 < END_MARKER_BITS {
            assert_eq!(progress, DecodeProgress::Accumulating);
        } else {
            assert_eq!(progress, DecodeProgress::MarkerFound);
        }
    }

    assert!(decoder.is_found());
    assert_eq!(decoder.bits_consumed(), END_MARKER_BITS);
    // 找到标记后的比特被忽略
    assert_eq!(decoder.push_bit(1), DecodeProgress::MarkerFound);
    assert_eq!(decoder.bits_consumed(), END_MARKER_BITS);
    assert_eq!(decoder.into_message(), Some(Vec::new()));
}

/// 验证在字节中途耗尽输入时报告未找到
#[test]
fn test_decode_partial_byte_is_not_found() {
    let bits = encode_bits(b"abc");
    let cut = &bits[..bits.len() - 3];

    assert_eq!(decode_bits(cut.iter().copied()), None);
    assert_eq!(decode_bits(std::iter::empty()), None);
}

/// 验证随机消息在随机图像中的往返
#[test]
fn test_round_trip_random_messages() {
    let mut rng = rand::rng();

    for _ in 0..20 {
        let mut grid = random_grid(40, 30);
        let len = rng.random_range(0..=max_message_len(&grid));
        let message: Vec<u8> = (0..len)
            .map(|_| rng.random_range(0u8..=255))
            .filter(|&b| b != b'|')
            .collect();

        let outcome = hide_checked(&mut grid, &message).expect("Message should fit.");
        assert!(outcome.is_complete());
        assert_eq!(reveal(&grid), Ok(message));
    }
}

/// 验证多字节 UTF-8 文本按字节往返
#[test]
fn test_round_trip_utf8_bytes() {
    let mut grid = random_grid(64, 64);
    let text = "Secret message 这是一个测试 ✓";

    let outcome = hide(&mut grid, text.as_bytes());

    assert!(outcome.is_complete());
    let recovered = reveal(&grid).expect("Message should be found.");
    assert_eq!(String::from_utf8(recovered).as_deref(), Ok(text));
}

/// 验证终止之后的像素与原图完全一致
#[test]
fn test_untouched_tail() {
    let original = random_grid(20, 20);
    let mut grid = original.clone();
    let message = b"tail check";

    let outcome = hide(&mut grid, message);
    let written = outcome.bits_written();
    assert_eq!(written, required_bits(message.len()));

    let before: &[u8] = original.as_raw();
    let after: &[u8] = grid.as_raw();
    assert_eq!(&before[written..], &after[written..]);

    // 被写入的通道只改变最低位
    for (a, b) in before[..written].iter().zip(&after[..written]) {
        assert_eq!(a & 0xFE, b & 0xFE);
    }
}

/// 验证容量恰好足够时可以往返
#[test]
fn test_capacity_boundary() {
    // "abc" + 标记 = 12 字节 = 96 bits = 32 像素
    let message = b"abc";

    let mut exact = random_grid(8, 4);
    assert_eq!(capacity_bits(&exact), required_bits(message.len()));
    assert!(check_capacity(&exact, message.len()).is_ok());
    assert_eq!(
        hide(&mut exact, message),
        EmbedOutcome::Complete { bits_written: 96 }
    );
    assert_eq!(reveal(&exact), Ok(message.to_vec()));
}

/// 验证少一个像素的容量会被检测到并报告为截断
#[test]
fn test_one_pixel_short_is_truncated() {
    // 31 像素 = 93 bits < 96 bits
    let mut grid = RgbImage::from_pixel(31, 1, Rgb([10, 20, 30]));
    let message = b"abc";

    assert_eq!(
        check_capacity(&grid, message.len()),
        Err(StegoError::InsufficientCapacity {
            required: 96,
            available: 93
        })
    );
    assert_eq!(
        hide(&mut grid, message),
        EmbedOutcome::Truncated {
            bits_written: 93,
            bits_required: 96
        }
    );
    assert_eq!(reveal(&grid), Err(StegoError::NoMarkerFound));
}

/// 验证只差一个比特时终止标记被截断，恢复时报告未找到
#[test]
fn test_one_bit_short_is_truncated() {
    // "hello" + 标记 = 14 字节 = 112 bits，37 像素 = 111 bits
    let message = b"hello";
    let mut grid = random_grid(37, 1);
    let capacity = capacity_bits(&grid);
    let bits = encode_bits(message);
    assert_eq!(bits.len(), capacity + 1);

    assert_eq!(
        check_capacity(&grid, message.len()),
        Err(StegoError::InsufficientCapacity {
            required: capacity + 1,
            available: capacity
        })
    );
    assert_eq!(
        embed_bits(&mut grid, &bits),
        EmbedOutcome::Truncated {
            bits_written: capacity,
            bits_required: capacity + 1
        }
    );
    assert_eq!(reveal(&grid), Err(StegoError::NoMarkerFound));

    // 相同数据在多一个像素的图像中可以完整恢复
    let mut roomy = random_grid(38, 1);
    assert!(embed_bits(&mut roomy, &bits).is_complete());
    assert_eq!(reveal(&roomy), Ok(message.to_vec()));
}

/// 验证从图像中提取时遇到终止标记立即停止扫描
#[test]
fn test_reveal_stops_scanning_at_marker() {
    let mut grid = random_grid(200, 200);
    let message = b"short";
    let _ = hide(&mut grid, message);

    let pulled = Cell::new(0usize);
    let decoded = decode_bits(extract_bits(&grid).inspect(|_| pulled.set(pulled.get() + 1)));

    assert_eq!(decoded.as_deref(), Some(&message[..]));
    assert_eq!(pulled.get(), required_bits(message.len()));
    assert!(pulled.get() < capacity_bits(&grid));
    assert_eq!(reveal(&grid), Ok(message.to_vec()));
}

/// 验证空消息与“未找到消息”的区别
#[test]
fn test_empty_message_is_distinct_from_not_found() {
    let mut grid = RgbImage::new(5, 5);

    assert_eq!(reveal(&grid), Err(StegoError::NoMarkerFound));

    let outcome = hide(&mut grid, b"");
    assert_eq!(outcome, EmbedOutcome::Complete { bits_written: 72 });
    assert_eq!(reveal(&grid), Ok(Vec::new()));
}

/// 验证重复提取结果一致
#[test]
fn test_extraction_is_idempotent() {
    let mut grid = random_grid(16, 16);
    let _ = hide(&mut grid, b"twice");
    let snapshot = grid.clone();

    let first = reveal(&grid);
    let second = reveal(&grid);

    assert_eq!(first, Ok(b"twice".to_vec()));
    assert_eq!(first, second);
    assert_eq!(grid, snapshot);
    assert!(extract_bits(&grid).eq(extract_bits(&snapshot)));
}

/// 验证按行优先、R-G-B 的顺序写入
#[test]
fn test_row_major_channel_order() {
    let mut grid = RgbImage::new(2, 2);
    let bits = [1, 0, 1, 1, 1, 0, 0, 1, 0];

    let outcome = embed_bits(&mut grid, &bits);

    assert!(outcome.is_complete());
    assert_eq!(grid.get_pixel(0, 0), &Rgb([1, 0, 1]));
    assert_eq!(grid.get_pixel(1, 0), &Rgb([1, 1, 0]));
    assert_eq!(grid.get_pixel(0, 1), &Rgb([0, 1, 0]));
    assert_eq!(grid.get_pixel(1, 1), &Rgb([0, 0, 0]));
    assert_eq!(
        extract_bits(&grid).take(9).collect::<Vec<_>>(),
        bits.to_vec()
    );
}

/// 3×3 的全零图像无法容纳 "Hi"，10×10 则可以
#[test]
fn test_small_grid_scenarios() {
    let mut small = RgbImage::new(3, 3);
    assert_eq!(capacity_bits(&small), 27);
    assert!(matches!(
        hide_checked(&mut small, b"Hi"),
        Err(StegoError::InsufficientCapacity {
            required: 88,
            available: 27
        })
    ));
    assert_eq!(small, RgbImage::new(3, 3), "Checked hide must not touch the grid.");

    let outcome = hide(&mut small, b"Hi");
    assert_eq!(
        outcome,
        EmbedOutcome::Truncated {
            bits_written: 27,
            bits_required: 88
        }
    );
    assert_eq!(reveal(&small), Err(StegoError::NoMarkerFound));

    let mut large = RgbImage::new(10, 10);
    assert_eq!(capacity_bits(&large), 300);
    let outcome = hide_checked(&mut large, b"Hi").expect("\"Hi\" fits in 300 channels.");
    assert_eq!(outcome, EmbedOutcome::Complete { bits_written: 88 });
    assert_eq!(reveal(&large), Ok(b"Hi".to_vec()));
}

/// 消息中包含终止标记时在第一次出现处截断
#[test]
fn test_message_containing_marker_is_cut() {
    let mut grid = random_grid(32, 32);
    let _ = hide(&mut grid, b"left|||END|||right");

    assert_eq!(reveal(&grid), Ok(b"left".to_vec()));
}
