//! Nested list containers for dialects whose list depth is a repeated marker (`**`, `##`)

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn open_tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "<ul>",
            ListKind::Ordered => "<ol>",
        }
    }

    pub fn close_tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "</ul>",
            ListKind::Ordered => "</ol>",
        }
    }
}

/// The currently open list: its kind and nesting depth
///
/// Switching kind closes every open container before opening the new one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NestedList {
    open: Option<(ListKind, usize)>,
}

impl NestedList {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Move to depth `level` of a list of `kind`
    pub fn nest(&mut self, html: &mut String, kind: ListKind, level: usize) {
        let mut depth = match self.open {
            Some((open, depth)) if open == kind => depth,
            _ => {
                self.close(html);
                0
            }
        };
        while depth < level {
            html.push_str(kind.open_tag());
            depth += 1;
        }
        while depth > level {
            html.push_str(kind.close_tag());
            depth -= 1;
        }
        self.open = Some((kind, depth));
    }

    /// Close every open container
    pub fn close(&mut self, html: &mut String) {
        if let Some((kind, depth)) = self.open.take() {
            html.push_str(&kind.close_tag().repeat(depth));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nest_and_unwind() {
        let mut html = String::new();
        let mut list = NestedList::default();
        list.nest(&mut html, ListKind::Unordered, 2);
        list.nest(&mut html, ListKind::Unordered, 1);
        list.nest(&mut html, ListKind::Ordered, 1);
        assert!(list.is_open());
        list.close(&mut html);
        assert!(!list.is_open());
        assert_eq!(html, "<ul><ul></ul></ul><ol></ol>");
    }
}
