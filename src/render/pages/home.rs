// ==========================================
// Trường Tồn 农场看板 - 首页
// ==========================================
// 页面入口卡片 + 使用说明
// ==========================================

use std::fmt::Write as _;

use crate::i18n::t;
use crate::render::format::escape_html;
use crate::render::html::{NavItem, Page};
use crate::render::style::Palette;

/// 入口卡片
struct EntryCard {
    href: &'static str,
    icon: &'static str,
    title: &'static str,
    detail: &'static str,
    accent: &'static str,
}

const ENTRIES: [EntryCard; 3] = [
    EntryCard {
        href: "/chi-phi",
        icon: "💰",
        title: "Chi Phí",
        detail: "Chi phí Công và Vật tư theo Farm, Đội, Lô",
        accent: Palette::GREEN,
    },
    EntryCard {
        href: "/dinh-muc",
        icon: "📐",
        title: "Định Mức",
        detail: "Tỉ lệ hoàn thành công việc biến động theo thời gian",
        accent: Palette::BLUE,
    },
    EntryCard {
        href: "/du-toan",
        icon: "🎯",
        title: "Dự Toán",
        detail: "Thành tiền thực tế so với dự toán Farm 195",
        accent: Palette::PURPLE,
    },
];

/// 使用说明条目（图标, 标题, 正文）
const COST_GUIDE: [(&str, &str, &str); 5] = [
    (
        "🔍",
        "Bộ lọc ở thanh bên trái",
        "Chọn Farm và khoảng Thời gian muốn xem, có thể lọc thêm theo Loại lô, Lô hoặc Đội. Bấm Áp dụng để cập nhật toàn bộ biểu đồ.",
    ),
    (
        "🏡",
        "Card Farm",
        "Mỗi farm là một ô gồm tổng chi phí và tỉ trọng Công / Vật tư. Bấm nút Drill bên dưới ô để xem xu hướng tháng và top đội của farm đó, bấm lại để bỏ chọn.",
    ),
    (
        "🔵",
        "Bubble Chart theo Lô",
        "Trục ngang là chi phí Công, trục dọc là chi phí Vật tư, kích thước bong bóng là tổng chi phí. Click vào bong bóng để drill vào lô.",
    ),
    (
        "👥",
        "Biểu đồ Đội",
        "Chi phí Công của từng đội chia thành Chính chủ và Hỗ trợ. Click vào thanh để drill vào đội.",
    ),
    (
        "🌀",
        "Sunburst Chart",
        "Cơ cấu chi phí Công theo Farm → Đội → Công đoạn và chi phí Vật tư theo Farm → Lô → Loại vật tư. Click vào mảnh để phóng to tầng đó.",
    ),
];

const QUOTA_GUIDE: [(&str, &str, &str); 4] = [
    (
        "📐",
        "Tỉ lệ hoàn thành",
        "Tỉ lệ = khối lượng thực tế ÷ số công ÷ định mức × 100%. Trên 100% là vượt định mức.",
    ),
    (
        "📅",
        "Độ chi tiết thời gian",
        "Chọn Ngày, Tuần, Tháng, Quý hoặc Năm ở thanh bên trái để đổi cách gom nhóm của biểu đồ xu hướng.",
    ),
    (
        "📈",
        "Đường xu hướng",
        "Đường trung bình và đường trung vị. Trung vị ít bị ảnh hưởng bởi các ngày bất thường.",
    ),
    (
        "🗓️",
        "Heatmap công việc",
        "Tỉ lệ hoàn thành của các công việc có nhiều dữ liệu nhất theo từng tháng. Xanh là đạt, vàng là gần đạt, đỏ là thấp.",
    ),
];

fn guide_rows(rows: &[(&str, &str, &str)]) -> String {
    let mut out = String::new();
    for (icon, heading, detail) in rows {
        let _ = write!(
            out,
            r#"<div style="display:flex;gap:14px;align-items:flex-start;margin-bottom:18px"><div style="min-width:32px;height:32px;border-radius:8px;display:flex;align-items:center;justify-content:center;font-size:15px;background:{gp}">{icon}</div><div><div style="font-size:12px;font-weight:600;color:{tx};margin-bottom:3px">{heading}</div><div style="font-size:12px;color:{ts};line-height:1.75">{detail}</div></div></div>"#,
            gp = Palette::GREEN_PALE,
            tx = Palette::TEXT,
            ts = Palette::TEXT_SUB,
            icon = icon,
            heading = escape_html(heading),
            detail = escape_html(detail),
        );
    }
    out
}

pub fn render() -> String {
    let mut page = Page::new(&t("nav.home"), NavItem::Home);

    page.push(format!(
        r#"<div style="text-align:center;padding:40px 0 24px"><div style="font-size:40px">🌿</div><div style="font-size:26px;font-weight:700;color:{tx};margin-top:8px">Trường Tồn</div><div style="font-size:13px;color:{tm};margin-top:6px">Dashboard vận hành nông trại</div></div>"#,
        tx = Palette::TEXT,
        tm = Palette::TEXT_MUTED,
    ));

    let mut cards = String::from(r#"<div class="grid" style="grid-template-columns:repeat(3,1fr);max-width:900px;margin:0 auto">"#);
    for card in &ENTRIES {
        let _ = write!(
            cards,
            r#"<a href="{href}" style="text-decoration:none"><div style="background:{sf};border:1px solid {bd};border-top:3px solid {accent};border-radius:10px;padding:24px;text-align:center"><div style="font-size:30px">{icon}</div><div style="font-size:16px;font-weight:700;color:{tx};margin:8px 0 4px">{title}</div><div style="font-size:12px;color:{tm}">{detail}</div></div></a>"#,
            href = card.href,
            sf = Palette::SURFACE,
            bd = Palette::BORDER,
            accent = card.accent,
            icon = card.icon,
            tx = Palette::TEXT,
            tm = Palette::TEXT_MUTED,
            title = escape_html(card.title),
            detail = escape_html(card.detail),
        );
    }
    cards.push_str("</div>");
    page.push(cards);

    page.push(format!(
        r#"<div style="max-width:900px;margin:40px auto 0;background:{sf};border:1px solid {bd};border-radius:10px;padding:32px 36px"><div style="font-size:12px;font-weight:700;text-transform:uppercase;letter-spacing:0.12em;color:{tm};margin-bottom:28px">📖 Hướng dẫn sử dụng</div><div style="display:grid;grid-template-columns:1fr 1fr;gap:40px"><div><div style="font-size:15px;font-weight:700;color:{tx};margin-bottom:16px">💰 Trang Chi Phí</div>{cost}</div><div><div style="font-size:15px;font-weight:700;color:{tx};margin-bottom:16px">📐 Trang Định Mức</div>{quota}</div></div><div style="margin-top:12px;background:{s2};border-left:3px solid {blue};border-radius:0 6px 6px 0;padding:12px 16px;font-size:12px;color:{ts};line-height:1.75">Sau khi drill, thanh bên trái hiện badge ghi tên mục đang được phóng to. Bấm ✕ để bỏ filter drill và quay về toàn bộ dữ liệu.</div></div>"#,
        sf = Palette::SURFACE,
        s2 = Palette::SURFACE2,
        bd = Palette::BORDER,
        tm = Palette::TEXT_MUTED,
        tx = Palette::TEXT,
        ts = Palette::TEXT_SUB,
        blue = Palette::BLUE,
        cost = guide_rows(&COST_GUIDE),
        quota = guide_rows(&QUOTA_GUIDE),
    ));

    page.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_links_every_page() {
        let html = render();
        for href in ["/chi-phi", "/dinh-muc", "/du-toan"] {
            assert!(html.contains(&format!(r#"<a href="{}" style="text-decoration:none">"#, href)));
        }
        assert!(html.contains("Hướng dẫn sử dụng"));
    }
}
