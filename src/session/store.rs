// ==========================================
// Trường Tồn 农场看板 - 会话存储
// ==========================================
// 键: (会话 ID, 页面)；值: 该页下钻状态
// 会话闲置超过 session_idle_secs 后由 moka 丢弃
// ==========================================

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use super::drill::DrillSelection;
use crate::domain::types::PageKey;

/// 会话最大数量
const MAX_SESSIONS: u64 = 10_000;

/// 会话 ID（cookie 中携带的 v4 UUID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 解析 cookie 值；非法值返回 None（调用方重新发放）
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Cache<(SessionId, PageKey), DrillSelection>,
}

impl SessionStore {
    pub fn new(idle: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// 读取下钻状态（不存在时为空选择）
    pub fn get(&self, sid: SessionId, page: PageKey) -> DrillSelection {
        self.inner.get(&(sid, page)).unwrap_or_default()
    }

    /// 修改并写回，返回修改后的状态
    pub fn update<F>(&self, sid: SessionId, page: PageKey, f: F) -> DrillSelection
    where
        F: FnOnce(&mut DrillSelection),
    {
        let mut selection = self.get(sid, page);
        f(&mut selection);
        self.inner.insert((sid, page), selection.clone());
        tracing::debug!(session = %sid, page = page.slug(), ?selection, "下钻状态更新");
        selection
    }

    pub fn clear(&self, sid: SessionId, page: PageKey) {
        self.inner.invalidate(&(sid, page));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DrillDimension;

    #[test]
    fn test_pages_have_independent_state() {
        let store = SessionStore::new(Duration::from_secs(60));
        let sid = SessionId::new();
        store.update(sid, PageKey::Cost, |s| {
            s.select(DrillDimension::Farm, "Farm 126");
        });
        assert_eq!(store.get(sid, PageKey::Cost).farm.as_deref(), Some("Farm 126"));
        assert!(store.get(sid, PageKey::Quota).is_empty());
        assert!(store.get(SessionId::new(), PageKey::Cost).is_empty());

        store.clear(sid, PageKey::Cost);
        assert!(store.get(sid, PageKey::Cost).is_empty());
    }

    #[test]
    fn test_session_id_parse() {
        let sid = SessionId::new();
        assert_eq!(SessionId::parse(&sid.to_string()), Some(sid));
        assert_eq!(SessionId::parse("khong-phai-uuid"), None);
    }
}
