use crate::IResult;
use nom::bytes::complete::take_while1;
use nom::character::complete::space0;
use nom::sequence::preceded;

/// Skip leading spaces/tabs before running `parser`
pub fn ws<'i, O, P>(mut parser: P) -> impl FnMut(&'i str) -> IResult<&'i str, O>
where
    P: FnMut(&'i str) -> IResult<&'i str, O>,
{
    move |i| preceded(space0, |i| parser(i))(i)
}

/// A single whitespace delimited field, leading whitespace is skipped
pub fn field(i: &str) -> IResult<&str, &str> {
    ws(take_while1(|c: char| !c.is_ascii_whitespace()))(i)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_skips_repeated_spaces() {
        let (rem, first) = field("  abc   def").unwrap();
        assert_eq!(first, "abc");

        let (rem, second) = field(rem).unwrap();
        assert_eq!(second, "def");
        assert!(rem.is_empty());
    }

    #[test]
    fn field_rejects_empty() {
        assert!(field("   ").is_err());
        assert!(field("").is_err());
    }
}
