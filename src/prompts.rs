use chrono::NaiveDate;
use serde_json::{Map, Value};
use crate::manager_openweather::models::ForecastEntry;

const FORTUNE_KEYWORDS: [&str; 6] = ["運勢", "星座", "生日", "命運", "luck", "fortune"];
const DEFAULT_DESCRIPTION: &str = "晴朗";

/// True when the message asks for a fortune reading
///
/// # Arguments
///
/// * 'message' - the user's message
pub fn is_fortune_request(message: &str) -> bool {
    let message = message.to_lowercase();
    FORTUNE_KEYWORDS.iter().any(|k| message.contains(k))
}

/// Formats a date the way the widget shows it to its users, e.g. 2024/6/1
pub fn display_date(date: NaiveDate) -> String {
    date.format("%Y/%-m/%-d").to_string()
}

/// Wraps a fortune request in the fortune teller template, other messages are sent as is
///
/// # Arguments
///
/// * 'message' - the user's message
/// * 'today' - the date the reading is for
pub fn chat_prompt(message: &str, today: NaiveDate) -> String {
    if is_fortune_request(message) {
        fortune_prompt(message, today)
    } else {
        message.to_string()
    }
}

/// Builds the fortune teller prompt
///
/// # Arguments
///
/// * 'message' - the user's message, usually a birthday or a zodiac sign
/// * 'today' - the date the reading is for
pub fn fortune_prompt(message: &str, today: NaiveDate) -> String {
    format!(r#"
你是一位溫柔的命理分析師。
使用者輸入：「{message}」
請根據生日與今日日期 ({today})，分析今日運勢。
請包含：
1️⃣ 整體運勢（以大吉、中吉、小吉、凶為主）
2️⃣ 感情運
3️⃣ 事業/學業運
4️⃣ 財運
5️⃣ 幸運色與幸運圖案
6️⃣ 今日建議或鼓勵的話
用親切的語氣與 emoji 撰寫。
最後請以 JSON 格式附上：
{{"運勢":"中吉","幸運色":"粉紅色","幸運圖案":"🌸 櫻花"}}
"#, message = message, today = display_date(today))
}

/// Builds the outfit and activity advice prompt for a forecast sample
///
/// # Arguments
///
/// * 'city' - resolved city name
/// * 'forecast' - the chosen forecast sample
/// * 'today' - the date the advice is asked on
pub fn outfit_prompt(city: &str, forecast: &ForecastEntry, today: NaiveDate) -> String {
    let description = forecast.description().unwrap_or(DEFAULT_DESCRIPTION);
    let time = match forecast.dt_txt() {
        Some(time) => time.to_string(),
        None => forecast.dt().format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    format!(r#"
今天是 {today}。
請根據以下「{city}」在 {time} 的天氣數據，提供詳細的穿搭建議和活動提醒。
---
天氣數據：
- 天氣狀況：{description}
- 溫度：攝氏 {temp}°C
- 體感溫度：攝氏 {feels_like}°C
- 濕度：{humidity}%
---
請包含以下內容：
1. ☀️ 天氣摘要 (用親切語氣)。
2. 🧥 穿搭建議 (針對上衣、下裝、外套、配件，需根據 {temp}°C 判斷)。
3. 👟 活動建議 (建議適合的天氣活動)。
4. 🌟 注意事項 (例如防曬、防雨、保暖)。
請使用 markdown 格式並搭配 emoji，總長約 100-150 字。
"#,
        today = display_date(today),
        city = city,
        time = time,
        description = description,
        temp = reading(forecast, "temp"),
        feels_like = reading(forecast, "feels_like"),
        humidity = reading(forecast, "humidity"),
    )
}

/// A measurement as written by OpenWeather, '-' when the sample lacks it
fn reading(forecast: &ForecastEntry, key: &str) -> String {
    match forecast.measurement(key) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "-".to_string(),
    }
}

/// Extracts the JSON summary a fortune reply ends with.
/// Everything from the first '{' to the last '}' must form a JSON object.
///
/// # Arguments
///
/// * 'reply' - the model's reply
pub fn extract_fortune(reply: &str) -> Option<Map<String, Value>> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str(&reply[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn forecast(description: Option<&str>) -> ForecastEntry {
        let weather = match description {
            Some(d) => serde_json::json!([{"description": d}]),
            None => serde_json::json!([]),
        };
        let json = serde_json::json!({
            "dt": 1717243200,
            "dt_txt": "2024-06-01 12:00:00",
            "main": {"temp": 31.2, "feels_like": 36.4, "humidity": 70},
            "weather": weather,
        });
        serde_json::from_str(&json.to_string()).unwrap()
    }

    #[test]
    fn fortune_keywords() {
        assert!(is_fortune_request("我的生日是 3/14，今天運勢如何？"));
        assert!(is_fortune_request("What is my LUCK today"));
        assert!(is_fortune_request("Fortune please"));
        assert!(!is_fortune_request("明天要帶傘嗎"));
        assert!(!is_fortune_request(""));
    }

    #[test]
    fn chat_prompt_only_wraps_fortunes() {
        assert_eq!(chat_prompt("hello there", today()), "hello there");

        let prompt = chat_prompt("天蠍座運勢", today());
        assert!(prompt.contains("使用者輸入：「天蠍座運勢」"));
        assert!(prompt.contains("(2024/6/1)"));
        assert!(prompt.contains(r#"{"運勢":"中吉","幸運色":"粉紅色","幸運圖案":"🌸 櫻花"}"#));
    }

    #[test]
    fn outfit_prompt_carries_the_measurements() {
        let prompt = outfit_prompt("Taipei", &forecast(Some("多雲")), today());

        assert!(prompt.contains("今天是 2024/6/1。"));
        assert!(prompt.contains("「Taipei」在 2024-06-01 12:00:00"));
        assert!(prompt.contains("天氣狀況：多雲"));
        assert!(prompt.contains("溫度：攝氏 31.2°C"));
        assert!(prompt.contains("體感溫度：攝氏 36.4°C"));
        assert!(prompt.contains("濕度：70%"));
    }

    #[test]
    fn outfit_prompt_default_description() {
        let prompt = outfit_prompt("Taipei", &forecast(None), today());
        assert!(prompt.contains("天氣狀況：晴朗"));
    }

    #[test]
    fn outfit_prompt_with_sparse_sample() {
        let sample: ForecastEntry = serde_json::from_str(r#"{"dt":1717243200,"main":{"temp":24}}"#).unwrap();
        let prompt = outfit_prompt("Taipei", &sample, today());

        assert!(prompt.contains("「Taipei」在 2024-06-01 12:00:00"));
        assert!(prompt.contains("溫度：攝氏 24°C"));
        assert!(prompt.contains("濕度：-%"));
    }

    #[test]
    fn fortune_summary() {
        let reply = "今天是中吉的一天！🌸\n\n```json\n{\"運勢\":\"大吉\",\"幸運色\":\"藍色\",\"幸運圖案\":\"🐳 鯨魚\"}\n```";
        let fortune = extract_fortune(reply).unwrap();

        assert_eq!(fortune.get("運勢"), Some(&Value::from("大吉")));
        assert_eq!(fortune.get("幸運色"), Some(&Value::from("藍色")));
    }

    #[test]
    fn fortune_summary_missing_or_broken() {
        assert_eq!(extract_fortune("no json here"), None);
        assert_eq!(extract_fortune("} backwards {"), None);
        assert_eq!(extract_fortune("{\"運勢\": }"), None);
        assert_eq!(extract_fortune("[1, 2] {oops"), None);
    }
}
