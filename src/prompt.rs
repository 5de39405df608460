//! Agent instructions and canned user turns.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};

/// Sent when the conversation has been silent for the nudge delay.
pub const DEFAULT_NUDGE_PROMPT: &str = "会話の情報に基づいて、盛り上がるように話を振ってください。\
全員のユーザーに一人ずつ話を振っていってください。また同じトピックを何回も振り続けるのはやめてください。\
トピックがなくなったら、最近の面白いニュースや出来事を検索して話題として振ってください。\
また、話の初めはさてやではから始めてください。";

/// Sent right after the session connects.
pub const DEFAULT_INTRO_PROMPT: &str = "各ユーザーに自己紹介するよう促してください";

fn weekday_ja(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "月曜日",
        Weekday::Tue => "火曜日",
        Weekday::Wed => "水曜日",
        Weekday::Thu => "木曜日",
        Weekday::Fri => "金曜日",
        Weekday::Sat => "土曜日",
        Weekday::Sun => "日曜日",
    }
}

/// `2026年10月18日日曜日`
pub fn format_date_ja<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!(
        "{}年{}月{}日{}",
        now.year(),
        now.month(),
        now.day(),
        weekday_ja(now.weekday())
    )
}

/// `09:05:03`
pub fn format_time_ja<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second())
}

/// Build the agent's system instructions.
///
/// `setting` is the user's free-text description of the conversation
/// (who is present, the occasion); it is inserted verbatim.
pub fn build_instructions<Tz: TimeZone>(now: &DateTime<Tz>, setting: &str) -> String {
    format!(
        "日本語で答えてください。

- 現在日付: {date}
- 現在時刻: {time} (日本時間)

# 会話の情報
{setting}

# 検索について

- 毎回の質問に`web_search`ツールの`tavily_search`で検索して答えてください。
- 検索キーワードは2～3単語のみでシンプルにするようにしてください。
- 天気予報はyahoo天気などの日本の天気予報サイトで検索してください。
- ニュースはyahooニュースなどの日本のニュースサイトで検索してください。
- 検索を開始する時は「検索を開始します」と伝えてください。
- 検索が終了したら結果を伝えてください。

# 会話の終了

- ユーザーから黙るよう指示された場合は、返答しないでください。
",
        date = format_date_ja(now),
        time = format_time_ja(now),
        setting = setting.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn jst(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date_ja(&jst(2026, 10, 18, 0, 0, 0)), "2026年10月18日日曜日");
        assert_eq!(format_date_ja(&jst(2025, 1, 6, 0, 0, 0)), "2025年1月6日月曜日");
    }

    #[test]
    fn test_format_time_zero_pads() {
        assert_eq!(format_time_ja(&jst(2026, 1, 1, 9, 5, 3)), "09:05:03");
    }

    #[test]
    fn test_instructions_embed_setting_and_clock() {
        let text = build_instructions(&jst(2026, 10, 18, 20, 30, 0), "  山田さんと佐藤さんの飲み会  ");
        assert!(text.starts_with("日本語で答えてください。"));
        assert!(text.contains("- 現在日付: 2026年10月18日日曜日"));
        assert!(text.contains("- 現在時刻: 20:30:00 (日本時間)"));
        assert!(text.contains("# 会話の情報\n山田さんと佐藤さんの飲み会\n"));
        assert!(text.contains("黙るよう指示された場合"));
    }

    #[test]
    fn test_instructions_with_empty_setting() {
        let text = build_instructions(&jst(2026, 10, 18, 20, 30, 0), "");
        assert!(text.contains("# 会話の情報\n\n\n# 検索について"));
    }
}
