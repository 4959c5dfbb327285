//! # 面板设备协议能力模块
//!
//! 设备侧线协议没有长度前缀，也没有分隔符：每次读取到的字节即为一帧。
//!
//! - **出站**：命令目录中的定义（文本载荷 + 编码 + 终止符标志）编码为原始字节
//! - **入站**：清洗原始字节（去 NUL、替换 BEL），再区分心跳回复与普通消息
//!
//! ```text
//! CommandDefinition ──encode──▶ bytes ──▶ socket
//!
//! socket ──▶ bytes ──sanitize_frame──▶ text ──classify_frame──▶ InboundFrame
//!                                                   ├── Empty          (丢弃)
//!                                                   ├── HeartbeatReply (心跳状态)
//!                                                   └── Message        (入库)
//! ```
//!
//! ## 编码格式
//!
//! | encoding | payload 示例 | 输出 |
//! |---|---|---|
//! | `ascii` | `~N` | `7E 4E` |
//! | `hex` | `01 03 00 00` | `01 03 00 00` |
//! | `base64` | `AQMAAA==` | `01 03 00 00` |
//!
//! 终止符追加顺序固定为 CR、LF、NUL。

mod encoder;
mod error;
mod frame;

pub use encoder::encode;
pub use error::EncodingError;
pub use frame::{InboundFrame, SIREN_ALERT_TEXT, classify_frame, lossy_text, parse_identifier, sanitize_frame};
