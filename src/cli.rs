//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{ArgAction, Parser, ValueEnum};
use image::ImageFormat;
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，在 RGB 图像中隐藏或恢复以终止标记结尾的消息。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，在 RGB 图像中隐藏或恢复以终止标记结尾的消息。\n结果图像应保存为无损格式 (PNG)，JPEG 会破坏隐藏的数据。"
)]
pub struct Cli {
    /// 提高日志详细程度 (-v: info, -vv: debug)。也可通过 RUST_LOG 设置。
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量查询)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在图像中隐藏文本文件内容。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文本。
    Recover(RecoverArgs),

    /// 查询图像可容纳的消息大小。
    Capacity(CapacityArgs),
}

/// 结果图像的保存格式。
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// 无损，隐藏的数据可以完整恢复。
    #[default]
    Png,
    /// 有损，重新压缩会破坏通道最低位。
    Jpeg,
}

impl OutputFormat {
    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (PNG, BMP, JPEG 等，会先转换为 RGB)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文本内容的文件路径 (按原始字节隐藏)。
    #[arg(short, long)]
    pub text: PathBuf,

    /// 结果图像的输出路径。默认为输入图像旁的 `doctored_<文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 结果图像的保存格式。
    #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// 目标文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,

    /// 容量不足时截断写入而不是报错 (截断后的消息无法恢复)。
    #[arg(long)]
    pub allow_truncate: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文本数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复文本的输出路径。默认为图像旁的 `recovered_<文件名>.txt`。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 目标文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要查询的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 可选：检查该文本文件能否完整放入图像。
    #[arg(short, long)]
    pub text: Option<PathBuf>,
}
