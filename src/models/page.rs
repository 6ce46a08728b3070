use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u32 = 10;

/// 列表接口的原始查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

pub(crate) fn contains_ignore_case(fields: &[&str], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

impl ListFilter {
    pub fn from_params(params: ListParams, max_page_size: u32) -> Self {
        let search = params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        // "all" 或空字符串表示不过滤状态
        let status = match params.status.as_deref().map(str::trim) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        Self {
            page: params.page.unwrap_or(1).max(1),
            limit: params
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, max_page_size.max(1)),
            search,
            status,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// 用于 SQL ILIKE 的模式
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| format!("%{s}%"))
    }

    pub fn matches_status(&self, active: bool) -> bool {
        self.status.is_none_or(|wanted| wanted == active)
    }

    /// 对已排序的完整结果分页，内存存储使用
    pub fn paginate<T>(&self, sorted: Vec<T>) -> Page<T> {
        let total = sorted.len() as u64;
        let items = sorted
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect();
        Page::new(items, total, self)
    }
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, filter: &ListFilter) -> Self {
        Self {
            items,
            pagination: Pagination {
                page: filter.page,
                limit: filter.limit,
                total,
                total_pages: total.div_ceil(u64::from(filter.limit)),
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
