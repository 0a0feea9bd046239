//! # 时间戳工具
//!
//! TTML 时间戳的解析与格式化，解析器和生成器共用。

use lyric_core::TtmlError;

/// 解析 TTML 时间字符串到毫秒。
///
/// 支持 `HH:MM:SS.mmm`、`MM:SS.mmm`、`SS.mmm`、`SS` 以及 `12.345s` 形式，
/// 毫秒部分最多 3 位。
///
/// # Errors
///
/// 格式无法识别、出现负数，或带冒号时分钟/秒不小于 60 时返回 [`TtmlError::InvalidTime`]。
pub fn parse_timespan(time_str: &str) -> Result<u64, TtmlError> {
    // 解析毫秒部分（.1, .12, .123）
    fn parse_decimal_ms_part(ms_str: &str, original_time_str: &str) -> Result<u64, TtmlError> {
        if ms_str.is_empty() || ms_str.len() > 3 || ms_str.chars().any(|c| !c.is_ascii_digit()) {
            return Err(TtmlError::InvalidTime(format!(
                "毫秒部分 '{ms_str}' 在时间戳 '{original_time_str}' 中无效 (只支持最多3位数字)"
            )));
        }
        let val = ms_str.parse::<u64>().map_err(|e| {
            TtmlError::InvalidTime(format!(
                "无法解析时间戳 '{original_time_str}' 中的毫秒部分 '{ms_str}': {e}"
            ))
        })?;
        Ok(val * 10u64.pow(3 - u32::try_from(ms_str.len()).unwrap_or(3)))
    }

    // 解析 "SS.mmm" 或 "SS"，返回秒和毫秒
    fn parse_seconds_part(
        seconds_and_ms_str: &str,
        original_time_str: &str,
    ) -> Result<(u64, u64), TtmlError> {
        let (seconds_str, ms_str) = match seconds_and_ms_str.split_once('.') {
            Some((seconds, ms)) => (seconds, Some(ms)),
            None => (seconds_and_ms_str, None),
        };

        if seconds_str.is_empty() {
            return Err(TtmlError::InvalidTime(format!(
                "时间戳 '{original_time_str}' 的秒部分为空"
            )));
        }
        if !seconds_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(TtmlError::InvalidTime(format!(
                "时间戳 '{original_time_str}' 中的秒 '{seconds_str}' 不是数字"
            )));
        }

        let seconds = seconds_str.parse::<u64>().map_err(|e| {
            TtmlError::InvalidTime(format!(
                "在时间戳 '{original_time_str}' 中解析秒 '{seconds_str}' 失败: {e}"
            ))
        })?;

        let milliseconds = match ms_str {
            Some(ms) => parse_decimal_ms_part(ms, original_time_str)?,
            None => 0,
        };

        Ok((seconds, milliseconds))
    }

    fn parse_clock_component(part: &str, label: &str, time_str: &str) -> Result<u64, TtmlError> {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(TtmlError::InvalidTime(format!(
                "在 '{time_str}' 中解析{label} '{part}' 失败"
            )));
        }
        part.parse::<u64>().map_err(|e| {
            TtmlError::InvalidTime(format!("在 '{time_str}' 中解析{label} '{part}' 失败: {e}"))
        })
    }

    // 秒数乘以倍率再加上毫秒，溢出时返回错误
    fn scaled_ms(value: u64, factor: u64, extra: u64, time_str: &str) -> Result<u64, TtmlError> {
        value
            .checked_mul(factor)
            .and_then(|ms| ms.checked_add(extra))
            .ok_or_else(|| TtmlError::InvalidTime(format!("时间戳 '{time_str}' 超出可表示的范围")))
    }

    let time_str = time_str.trim();
    if time_str.starts_with('-') {
        return Err(TtmlError::InvalidTime(format!(
            "时间戳不能为负: '{time_str}'"
        )));
    }

    // 格式："12.345s"
    if let Some(stripped) = time_str.strip_suffix('s') {
        if stripped.is_empty() || stripped.ends_with('.') || stripped.contains(':') {
            return Err(TtmlError::InvalidTime(format!(
                "时间戳 '{time_str}' 包含无效的秒格式"
            )));
        }
        let (seconds, milliseconds) = parse_seconds_part(stripped, time_str)?;
        return scaled_ms(seconds, 1000, milliseconds, time_str);
    }

    // 格式："HH:MM:SS.mmm", "MM:SS.mmm", "SS.mmm"，从后往前解析
    let mut parts_iter = time_str.split(':').rev();

    let seconds_part = parts_iter
        .next()
        .ok_or_else(|| TtmlError::InvalidTime(format!("时间格式 '{time_str}' 无效或为空")))?;
    let (seconds, milliseconds) = parse_seconds_part(seconds_part, time_str)?;
    let mut total_ms = scaled_ms(seconds, 1000, milliseconds, time_str)?;

    let mut has_colon = false;
    if let Some(minutes_str) = parts_iter.next() {
        has_colon = true;
        let minutes = parse_clock_component(minutes_str, "分钟", time_str)?;
        if minutes >= 60 {
            return Err(TtmlError::InvalidTime(format!(
                "分钟值 '{minutes}' (应 < 60) 在时间戳 '{time_str}' 中无效"
            )));
        }
        total_ms = scaled_ms(minutes, 60_000, total_ms, time_str)?;
    }

    if let Some(hours_str) = parts_iter.next() {
        let hours = parse_clock_component(hours_str, "小时", time_str)?;
        total_ms = scaled_ms(hours, 3_600_000, total_ms, time_str)?;
    }

    if parts_iter.next().is_some() {
        return Err(TtmlError::InvalidTime(format!(
            "时间格式 '{time_str}' 包含过多部分"
        )));
    }

    // 单独的 "SS.mmm" 秒数可以大于59
    if has_colon && seconds >= 60 {
        return Err(TtmlError::InvalidTime(format!(
            "秒值 '{seconds}' (应 < 60) 在时间戳 '{time_str}' 中无效"
        )));
    }

    Ok(total_ms)
}

/// 将毫秒时间戳格式化为 `HH:MM:SS.mmm`。
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timespan() {
        assert_eq!(parse_timespan("7.1s").unwrap(), 7100);
        assert_eq!(parse_timespan("7.12s").unwrap(), 7120);
        assert_eq!(parse_timespan("7.123s").unwrap(), 7123);
        assert_eq!(parse_timespan("99999.123s").unwrap(), 99_999_123);
        assert_eq!(parse_timespan("01:02:03.456").unwrap(), 3_723_456);
        assert_eq!(parse_timespan("05:10.1").unwrap(), 310_100);
        assert_eq!(parse_timespan("05:10.12").unwrap(), 310_120);
        assert_eq!(parse_timespan("7.123").unwrap(), 7123);
        assert_eq!(parse_timespan("7").unwrap(), 7000);
        assert_eq!(parse_timespan("15s").unwrap(), 15000);
        assert_eq!(parse_timespan(" 00:00:01.000 ").unwrap(), 1000);

        assert_eq!(parse_timespan("0").unwrap(), 0);
        assert_eq!(parse_timespan("00:00:00.000").unwrap(), 0);
        assert_eq!(parse_timespan("99:59:59.999").unwrap(), 359_999_999);
        assert_eq!(parse_timespan("60").unwrap(), 60000);
        assert_eq!(parse_timespan("18446744073709551.614").unwrap(), u64::MAX - 1);

        for bad in [
            "abc",
            "1:2:3:4",
            "01:60:00.000",
            "01:00:60.000",
            "-10s",
            "-01:00:00.000",
            "10.s",
            ".5s",
            "s",
            "10.1234s",
            "10.abc",
            "01:00:.000",
            "+5",
            "",
            "99999999999999999s",
            "18446744073709551.616",
            "9999999999999:00:00",
        ] {
            assert!(
                matches!(parse_timespan(bad), Err(TtmlError::InvalidTime(_))),
                "'{bad}' 应当解析失败"
            );
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(3_723_456), "01:02:03.456");
        assert_eq!(format_timestamp(310_100), "00:05:10.100");
        assert_eq!(format_timestamp(7123), "00:00:07.123");
        assert_eq!(format_timestamp(0), "00:00:00.000");
        assert_eq!(format_timestamp(360_000_000), "100:00:00.000");
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        for ms in [0, 1, 999, 1000, 59_999, 60_000, 3_599_999, 3_600_000, 86_400_123] {
            assert_eq!(parse_timespan(&format_timestamp(ms)).unwrap(), ms);
        }
    }
}
