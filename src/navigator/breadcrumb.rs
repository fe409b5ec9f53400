//! Breadcrumb derivation for the picker header.
//!
//! `/a/b/c` → Home, a (/a), b (/a/b), c (/a/b/c). Windows paths keep their
//! drive prefix (`C:\Users` → Home, C: (C:\), Users (C:\Users)). The Home
//! crumb is always first and always goes to the home directory, whatever the
//! current depth. The roots view (empty path) has only Home.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreadcrumbTarget {
    Home,
    Path(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub target: BreadcrumbTarget,
}

pub fn breadcrumbs(current_path: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        label: "Home".to_string(),
        target: BreadcrumbTarget::Home,
    }];

    let separator = if current_path.contains('\\') { '\\' } else { '/' };
    let absolute_unix = current_path.starts_with('/');
    let segments: Vec<&str> = current_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect();

    let mut prefix = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i == 0 {
            if absolute_unix {
                prefix.push(separator);
            }
        } else if !prefix.ends_with(separator) {
            prefix.push(separator);
        }
        prefix.push_str(segment);

        let mut target = prefix.clone();
        // A bare drive letter needs its separator to name the root
        if i == 0 && !absolute_unix && segment.ends_with(':') {
            target.push(separator);
            prefix.push(separator);
        }

        crumbs.push(Breadcrumb {
            label: segment.to_string(),
            target: BreadcrumbTarget::Path(target),
        });
    }

    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(path: &str) -> Vec<BreadcrumbTarget> {
        breadcrumbs(path).into_iter().map(|c| c.target).collect()
    }

    fn path(p: &str) -> BreadcrumbTarget {
        BreadcrumbTarget::Path(p.to_string())
    }

    #[test]
    fn test_unix_path() {
        let crumbs = breadcrumbs("/a/b/c");
        assert_eq!(crumbs.len(), 4);
        let labels: Vec<_> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Home", "a", "b", "c"]);
        assert_eq!(
            targets("/a/b/c"),
            vec![BreadcrumbTarget::Home, path("/a"), path("/a/b"), path("/a/b/c")]
        );
    }

    #[test]
    fn test_empty_segments_discarded() {
        assert_eq!(
            targets("//a///b/"),
            vec![BreadcrumbTarget::Home, path("/a"), path("/a/b")]
        );
    }

    #[test]
    fn test_roots_view_and_filesystem_root() {
        assert_eq!(targets(""), vec![BreadcrumbTarget::Home]);
        assert_eq!(targets("/"), vec![BreadcrumbTarget::Home]);
    }

    #[test]
    fn test_windows_path() {
        assert_eq!(
            targets("C:\\Users\\joao"),
            vec![
                BreadcrumbTarget::Home,
                path("C:\\"),
                path("C:\\Users"),
                path("C:\\Users\\joao"),
            ]
        );
    }

    #[test]
    fn test_windows_drive_root() {
        assert_eq!(targets("D:\\"), vec![BreadcrumbTarget::Home, path("D:\\")]);
    }
}
