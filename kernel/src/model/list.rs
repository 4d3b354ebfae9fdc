use crate::model::id::PaymentId;

// ID の降順に並べ、前のページの最後の ID より小さいものだけを取り出す。
// ID は変わらないので、ページの間に行が追加・確定されても読み飛ばしや重複が起きない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page_size: i64,
    // None なら先頭のページ
    pub before: Option<PaymentId>,
}

impl ListOptions {
    pub fn new(page_size: i64) -> Self {
        Self {
            page_size: page_size.max(1),
            before: None,
        }
    }

    pub fn before(self, before: Option<PaymentId>) -> Self {
        Self { before, ..self }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

#[derive(Debug)]
pub struct PaginatedList<T> {
    // 条件に合う行の総数。カーソルには依存しない
    pub total: i64,
    pub page_size: i64,
    // 続きがあるときだけ、次のページの before に渡す ID
    pub next_cursor: Option<PaymentId>,
    pub items: Vec<T>,
}

impl<T> PaginatedList<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedList<U> {
        PaginatedList {
            total: self.total,
            page_size: self.page_size,
            next_cursor: self.next_cursor,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_has_no_cursor() {
        let options = ListOptions::new(20);
        assert_eq!(options.before, None);
        assert_eq!(options.limit(), 20);
    }

    #[test]
    fn non_positive_sizes_are_clamped() {
        let options = ListOptions::new(0).before(Some(PaymentId::new(10)));
        assert_eq!(options.limit(), 1);
        assert_eq!(options.before, Some(PaymentId::new(10)));
    }
}
