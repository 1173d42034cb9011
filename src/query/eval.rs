use super::ast::{CompareOp, Expr, LogicalOp};
use crate::date::DateKey;

pub fn evaluate(expr: &Expr, date: &DateKey, event: &str) -> bool {
    match expr {
        Expr::Empty => true,
        Expr::DateCompare { op, date: literal } => compare_ord(date, literal, *op),
        Expr::EventCompare { op, value } => compare_ord(event, value.as_str(), *op),
        Expr::Logical {
            op: LogicalOp::And,
            left,
            right,
        } => evaluate(left, date, event) && evaluate(right, date, event),
        Expr::Logical {
            op: LogicalOp::Or,
            left,
            right,
        } => evaluate(left, date, event) || evaluate(right, date, event),
    }
}

fn compare_ord<T: Ord + ?Sized>(a: &T, b: &T, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Gt => a > b,
        CompareOp::Lt => a < b,
        CompareOp::Ge => a >= b,
        CompareOp::Le => a <= b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u8, d: u8) -> DateKey {
        DateKey::new(y, m, d).unwrap()
    }

    fn date_cmp(op: CompareOp) -> Expr {
        Expr::DateCompare {
            op,
            date: date(2017, 11, 18),
        }
    }

    fn event_cmp(op: CompareOp, value: &str) -> Expr {
        Expr::EventCompare {
            op,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_empty_matches_everything() {
        assert!(evaluate(&Expr::Empty, &date(1, 1, 1), ""));
        assert!(evaluate(&Expr::Empty, &date(9999, 12, 31), "anything"));
    }

    #[test]
    fn test_date_comparisons() {
        let before = date(2017, 11, 17);
        let same = date(2017, 11, 18);
        let after = date(2017, 11, 19);

        let cases = [
            (CompareOp::Eq, [false, true, false]),
            (CompareOp::Ne, [true, false, true]),
            (CompareOp::Lt, [true, false, false]),
            (CompareOp::Le, [true, true, false]),
            (CompareOp::Gt, [false, false, true]),
            (CompareOp::Ge, [false, true, true]),
        ];

        for (op, expected) in cases {
            let expr = date_cmp(op);
            assert_eq!(evaluate(&expr, &before, ""), expected[0], "{:?} before", op);
            assert_eq!(evaluate(&expr, &same, ""), expected[1], "{:?} same", op);
            assert_eq!(evaluate(&expr, &after, ""), expected[2], "{:?} after", op);
        }
    }

    #[test]
    fn test_event_comparisons_are_lexicographic() {
        let d = date(2017, 1, 1);
        assert!(evaluate(&event_cmp(CompareOp::Eq, "holiday"), &d, "holiday"));
        assert!(!evaluate(&event_cmp(CompareOp::Eq, "holiday"), &d, "Holiday"));
        assert!(evaluate(&event_cmp(CompareOp::Ne, "holiday"), &d, "work"));
        assert!(evaluate(&event_cmp(CompareOp::Lt, "aa"), &d, "a"));
        assert!(!evaluate(&event_cmp(CompareOp::Lt, "aa"), &d, "aaa"));
        assert!(evaluate(&event_cmp(CompareOp::Ge, "aa"), &d, "aa"));
        assert!(evaluate(&event_cmp(CompareOp::Gt, "aa"), &d, "b"));
        assert!(evaluate(&event_cmp(CompareOp::Le, "b"), &d, "aaa"));
    }

    #[test]
    fn test_logical() {
        let d = date(2017, 11, 18);
        let expr = Expr::and(date_cmp(CompareOp::Eq), event_cmp(CompareOp::Eq, "x"));
        assert!(evaluate(&expr, &d, "x"));
        assert!(!evaluate(&expr, &d, "y"));

        let expr = Expr::or(date_cmp(CompareOp::Ne), event_cmp(CompareOp::Eq, "x"));
        assert!(evaluate(&expr, &d, "x"));
        assert!(!evaluate(&expr, &d, "y"));
        assert!(evaluate(&expr, &date(2018, 1, 1), "y"));
    }
}
