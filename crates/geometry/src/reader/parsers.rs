//! Library of parser functions for OFF files

// external crates
use nalgebra::Vector3;

// nom parser combinators
use nom::bytes::complete::tag;
use nom::character::complete::{digit1, space0, space1};
use nom::combinator::{map, map_res, opt};
use nom::multi::count;
use nom::number::complete::double;
use nom::sequence::{preceded, tuple};
use nom::IResult;

// ! Boolean checks
/// Check for the `OFF` keyword that opens every file
pub fn is_off_header(i: &str) -> bool {
    off_header(i).is_ok()
}

/// Check for lines with nothing but whitespace or a comment
pub fn is_ignored(i: &str) -> bool {
    let trimmed = i.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

// ! Parser combinators

/// Unsigned integer, e.g. a count or vertex index
pub fn unsigned(i: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(i)
}

/// The `OFF` keyword
pub fn off_header(i: &str) -> IResult<&str, &str> {
    preceded(space0, tag("OFF"))(i)
}

/// Vertex, face and edge counts, with the edge count optional
pub fn counts(i: &str) -> IResult<&str, (usize, usize, Option<usize>)> {
    tuple((
        preceded(space0, unsigned),
        preceded(space1, unsigned),
        opt(preceded(space1, unsigned)),
    ))(i)
}

/// Three coordinates of a vertex
pub fn vertex(i: &str) -> IResult<&str, Vector3<f64>> {
    map(
        tuple((
            preceded(space0, double),
            preceded(space1, double),
            preceded(space1, double),
        )),
        |(x, y, z)| Vector3::new(x, y, z),
    )(i)
}

/// Face as a vertex count followed by that many indices
///
/// Anything after the indices, such as a colour, is left unparsed.
pub fn face(i: &str) -> IResult<&str, Vec<usize>> {
    let (i, n) = preceded(space0, unsigned)(i)?;
    count(preceded(space1, unsigned), n)(i)
}
