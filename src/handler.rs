//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、图像格式转换、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::error::StegoError;
use crate::steganography::{
    EmbedOutcome, capacity_bits, check_capacity, hide, hide_checked, max_message_len, reveal,
};
use anyhow::{Context, Result};
use colored::Colorize;
use image::{GenericImageView, ImageFormat, ImageReader, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// 读取图像并统一转换为 8 位 RGB 像素网格 (丢弃 alpha 通道)。
fn load_rgb(path: &Path) -> Result<RgbImage> {
    let context = || {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    };

    // 按文件内容而不是扩展名识别格式
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .with_context(context)?;
    let image = reader.decode().with_context(context)?;

    let (width, height) = image.dimensions();
    log::debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        width,
        height,
        image.color()
    );

    Ok(image.to_rgb8())
}

/// 在 `source` 所在目录下生成 `<prefix><文件名主干>.<extension>`。
fn sibling_path(source: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let file_name = format!("{prefix}{stem}.{extension}");

    match source.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// 未指定 `--force` 时拒绝覆盖已存在的文件。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}\nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本文件、检查隐写空间是否足够、调用隐写核心函数写入消息和终止标记，
/// 最后按所选格式将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径及选项的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文本文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 目标文件扩展名与 `--format` 不一致。
/// * 图像没有足够的空间，且未指定 `--allow-truncate`。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| sibling_path(&args.image, "doctored_", args.format.extension()));
    ensure_writable(&dest, args.force)?;

    // 扩展名可识别时必须与 --format 一致
    if let Ok(dest_format) = ImageFormat::from_path(&dest) {
        anyhow::ensure!(
            dest_format == args.format.image_format(),
            "Output extension does not match --format {:?}: {}\nUse a .{} file name or change --format.",
            args.format,
            dest.to_string_lossy().red().bold(),
            args.format.extension().green().bold()
        );
    }

    let mut grid = load_rgb(&args.image)?;

    let text = fs::read(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    log::info!(
        "Hiding {} bytes in {} ({} bits available)",
        text.len(),
        args.image.display(),
        capacity_bits(&grid)
    );

    let outcome = if args.allow_truncate {
        hide(&mut grid, &text)
    } else {
        match hide_checked(&mut grid, &text) {
            Ok(outcome) => outcome,
            Err(StegoError::InsufficientCapacity {
                required,
                available,
            }) => anyhow::bail!(
                "Not enough space in the image to hide the text. \nRequired: {} bits, Available: {} bits",
                required.to_string().red().bold(),
                available.to_string().green().bold()
            ),
            Err(e) => return Err(e.into()),
        }
    };

    if args.format.is_lossy() {
        log::warn!("Saving as lossy {:?}; embedded bits will not survive", args.format);
        eprintln!(
            "{} {} output re-compresses pixels and destroys the hidden message. Use PNG to keep it recoverable.",
            "Warning:".yellow().bold(),
            "JPEG".yellow()
        );
    }

    grid.save_with_format(&dest, args.format.image_format())
        .with_context(|| {
            format!(
                "Unable to write to target image file: {}",
                dest.to_string_lossy().red().bold()
            )
        })?;

    match outcome {
        EmbedOutcome::Complete { bits_written } => {
            log::info!("Wrote {} bits to {}", bits_written, dest.display());
            println!(
                "The text has been successfully hidden and saved: {}",
                dest.to_string_lossy().green().bold()
            );
        }
        EmbedOutcome::Truncated {
            bits_written,
            bits_required,
        } => {
            eprintln!(
                "{} only {} of {} bits fit into the image; the message cannot be recovered.",
                "Warning:".yellow().bold(),
                bits_written.to_string().red().bold(),
                bits_required.to_string().green().bold()
            );
            println!(
                "The truncated text has been saved: {}",
                dest.to_string_lossy().yellow().bold()
            );
        }
    }

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、扫描通道最低位直到遇到终止标记，
/// 最后将恢复的文本内容写入目标文本文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 图像中没有隐藏的消息 (未找到终止标记)。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let dest = args
        .text
        .clone()
        .unwrap_or_else(|| sibling_path(&args.image, "recovered_", "txt"));
    ensure_writable(&dest, args.force)?;

    let grid = load_rgb(&args.image)?;

    let text = reveal(&grid).with_context(|| {
        format!(
            "No hidden message found in '{}'. \nThe image may not contain a message, was truncated, or was saved in a lossy format.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    log::info!("Recovered {} bytes from {}", text.len(), args.image.display());

    fs::write(&dest, text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
///
/// 报告图像的可用比特数与可隐藏的最长消息；指定文本文件时一并检查其能否完整放入。
///
/// # Errors
///
/// 无法读取图像或文本文件，或文本超出图像容量时返回错误。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let grid = load_rgb(&args.image)?;

    println!(
        "{}: {}x{} pixels, {} bits available, up to {} bytes of text",
        args.image.to_string_lossy().bold(),
        grid.width(),
        grid.height(),
        capacity_bits(&grid).to_string().green().bold(),
        max_message_len(&grid).to_string().green().bold()
    );

    if let Some(text_path) = &args.text {
        let len = fs::metadata(text_path)
            .with_context(|| {
                format!(
                    "Unable to read text file: {}",
                    text_path.to_string_lossy().red().bold()
                )
            })?
            .len();
        let len = usize::try_from(len).context("Text file is too large")?;

        check_capacity(&grid, len).map_err(|e| {
            anyhow::anyhow!(
                "Not enough space in the image to hide {}: {}",
                text_path.to_string_lossy().red().bold(),
                e
            )
        })?;

        println!(
            "{} ({} bytes) fits into the image.",
            text_path.to_string_lossy().green().bold(),
            len
        );
    }

    Ok(())
}
