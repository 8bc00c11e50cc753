//! Shared formatting helpers for views

/// Format a runtime in minutes as `2h 22m`. Unknown or zero renders empty.
pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        Some(m) if m > 0 => format!("{}h {}m", m / 60, m % 60),
        _ => String::new(),
    }
}

/// Format a 0-10 rating with one decimal.
pub fn format_rating(rating: f64) -> String {
    format!("{:.1}", rating)
}

/// Format a count with thousands separators (`1234567` -> `1,234,567`).
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Split items into rows of `size`. A zero size keeps everything on one row.
pub fn chunk_rows<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    let size = if size == 0 { items.len() } else { size };
    items.chunks(size).map(<[T]>::to_vec).collect()
}

/// Join names for display.
pub fn join_names(names: &[String]) -> String {
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(Some(142)), "2h 22m");
        assert_eq!(format_runtime(Some(45)), "0h 45m");
        assert_eq!(format_runtime(Some(120)), "2h 0m");
        assert_eq!(format_runtime(Some(0)), "");
        assert_eq!(format_runtime(None), "");
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(8.712), "8.7");
        assert_eq!(format_rating(7.0), "7.0");
        assert_eq!(format_rating(0.0), "0.0");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_chunk_rows() {
        let items: Vec<u32> = (1..=10).collect();
        let rows = chunk_rows(&items, 4);
        assert_eq!(rows, vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9, 10]]);

        assert_eq!(chunk_rows(&items, 0), vec![items.clone()]);
        assert!(chunk_rows::<u32>(&[], 4).is_empty());
    }
}
