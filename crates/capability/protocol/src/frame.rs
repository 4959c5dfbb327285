//! 入站帧清洗与分类

/// 旧款面板以单个 BEL 字节上报警笛触发，入库时替换为该文本。
pub const SIREN_ALERT_TEXT: &str = "SIRENAS ACTIVADAS";

const NUL: u8 = 0x00;
const BEL: u8 = 0x07;

/// 入站帧分类结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// 清洗后为空，直接丢弃
    Empty,
    /// 与配置的期望心跳回复完全一致
    HeartbeatReply,
    /// 普通设备消息
    Message(String),
}

/// 握手帧：宽松解码后去除首尾空白，空则返回 `None`。
pub fn parse_identifier(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let identifier = text.trim();
    if identifier.is_empty() {
        return None;
    }
    Some(identifier.to_string())
}

/// 清洗消息帧：删除 NUL，BEL 替换为警笛文本，宽松解码并去除首尾空白。
pub fn sanitize_frame(raw: &[u8]) -> String {
    let mut cleaned = Vec::with_capacity(raw.len());
    for &byte in raw {
        match byte {
            NUL => {}
            BEL => cleaned.extend_from_slice(SIREN_ALERT_TEXT.as_bytes()),
            other => cleaned.push(other),
        }
    }
    String::from_utf8_lossy(&cleaned).trim().to_string()
}

/// 心跳回复按完全相等判断；未启用心跳检查时 `expected_reply` 为 `None`。
pub fn classify_frame(text: String, expected_reply: Option<&str>) -> InboundFrame {
    if text.is_empty() {
        return InboundFrame::Empty;
    }
    match expected_reply {
        Some(expected) if expected == text => InboundFrame::HeartbeatReply,
        _ => InboundFrame::Message(text),
    }
}

/// 出站字节转为可入库文本：无法解码的字节被替换而不是拒绝，
/// NUL 被删除（Postgres `text` 列不接受 U+0000）。
pub fn lossy_text(bytes: &[u8]) -> String {
    let kept: Vec<u8> = bytes.iter().copied().filter(|&byte| byte != NUL).collect();
    String::from_utf8_lossy(&kept).into_owned()
}
