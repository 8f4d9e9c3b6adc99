/// lib.rs - 绳子与弹跳小球加载动画
///
/// 动画本身（状态机、贝塞尔控制点计算）与宿主的定时器、画布解耦：
/// 宿主提供尺寸和时间，取回每帧的快照并自行绘制。
#[macro_use]
extern crate tracing;

/// 补间动画与可共享时钟
pub mod animation;

/// 命令行参数解析
pub mod cli;

/// 配置文件加载
pub mod config;

/// 帧时钟：对齐刷新周期
pub mod frame_clock;

/// 加载控件：布局、绳子形状、两阶段状态机
pub mod loading;

/// 帧快照、绘制指令与软件画布
pub mod render;

/// calloop 定时驱动
pub mod ticker;

/// 工具函数
pub mod utils;

#[cfg(test)]
mod tests;
