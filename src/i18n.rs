// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持越南语（默认，业务用户语言）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "vi";

/// 已提供翻译文件的语言
pub const SUPPORTED_LOCALES: &[&str] = &["vi", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"vi" 或 "en"）；不支持的语言回退到默认语言
pub fn set_locale(locale: &str) {
    let locale = if SUPPORTED_LOCALES.contains(&locale) {
        locale
    } else {
        tracing::warn!(locale, "不支持的语言，回退到默认语言");
        DEFAULT_LOCALE
    };
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use farm_ops_dashboard::i18n::t;
/// let msg = t("notice.no_farm");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use farm_ops_dashboard::i18n::t_with_args;
/// let msg = t_with_args("table.showing_rows", &[("shown", "20"), ("total", "57"), ("top", "20")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("vi");
        assert_eq!(current_locale(), "vi");
    }

    #[test]
    fn test_unsupported_locale_falls_back() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(current_locale(), DEFAULT_LOCALE);
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("vi");
        assert_eq!(t("notice.no_farm"), "Chọn ít nhất 1 farm");

        set_locale("en");
        assert_eq!(t("notice.no_farm"), "Select at least one farm");

        set_locale("vi");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("vi");
        let msg = t_with_args(
            "table.showing_rows",
            &[("shown", "20"), ("total", "57"), ("top", "20")],
        );
        assert_eq!(msg, "Hiển thị 20 / 57 dòng (top 20 sau lọc)");

        set_locale("en");
        let msg = t_with_args(
            "table.showing_rows",
            &[("shown", "3"), ("total", "3"), ("top", "20")],
        );
        assert!(msg.contains("3 / 3"));

        set_locale("vi");
    }
}
