//! Position resolution
//!
//! Turns a flat bitmap over a callable's receiver, parameters and results
//! into the selected receiver flag and the selected parameter and result
//! indexes, each relative to its own list.
//!
//! Variadic parameters are not collapsed here. Consumers that match call
//! arguments use [`PositionSplit::param_matches`], which turns a selected
//! variadic slot into "this argument and every one after it".

use crate::error::{Error, Result};
use crate::qualifier::FlowBlock;
use selspec_meta::{Callable, ElementKind, Lengths};

/// Selected elements of a callable, split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionSplit {
    pub receiver: bool,
    /// Selected parameter indexes, ascending
    pub params: Vec<usize>,
    /// Selected result indexes, ascending
    pub results: Vec<usize>,
}

impl PositionSplit {
    /// Number of selected elements
    pub fn len(&self) -> usize {
        usize::from(self.receiver) + self.params.len() + self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selected parameters as argument matchers.
    ///
    /// When the callable is variadic, a selected last parameter matches
    /// every argument at or after its index.
    pub fn param_matches(&self, variadic: bool, param_count: usize) -> Vec<ParamMatch> {
        self.params
            .iter()
            .map(|&index| {
                if variadic && index + 1 == param_count {
                    ParamMatch::AtLeast(index)
                } else {
                    ParamMatch::Exact(index)
                }
            })
            .collect()
    }
}

/// How a selected parameter matches call arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMatch {
    /// Exactly the argument at this index
    Exact(usize),
    /// The argument at this index and all following ones
    AtLeast(usize),
}

impl ParamMatch {
    pub fn matches(&self, argument: usize) -> bool {
        match *self {
            ParamMatch::Exact(index) => argument == index,
            ParamMatch::AtLeast(index) => argument >= index,
        }
    }
}

/// Split a position bitmap for a callable with the given shape.
///
/// The bitmap must have exactly `lengths.total()` entries.
pub fn resolve_positions(lengths: Lengths, pos: &[bool]) -> Result<PositionSplit> {
    if pos.len() != lengths.total() {
        return Err(Error::PositionLengthMismatch {
            expected: lengths.total(),
            found: pos.len(),
        });
    }

    let mut split = PositionSplit::default();
    for (absolute, _) in pos.iter().enumerate().filter(|(_, set)| **set) {
        // In range: the length check above guarantees it
        let Some(element) = lengths.relative(absolute) else {
            continue;
        };
        match element.kind {
            ElementKind::Receiver => split.receiver = true,
            ElementKind::Parameter => split.params.push(element.relative),
            ElementKind::Result => split.results.push(element.relative),
        }
    }
    Ok(split)
}

/// [`resolve_positions`] against a resolved callable
pub fn resolve_callable(callable: &impl Callable, pos: &[bool]) -> Result<PositionSplit> {
    resolve_positions(callable.lengths(), pos)
}

/// Resolve the input and output bitmaps of one flow block
pub fn resolve_flow_block(
    lengths: Lengths,
    block: &FlowBlock,
) -> Result<(PositionSplit, PositionSplit)> {
    Ok((
        resolve_positions(lengths, &block.inp)?,
        resolve_positions(lengths, &block.out)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(receiver: bool, params: &[usize], results: &[usize]) -> PositionSplit {
        PositionSplit {
            receiver,
            params: params.to_vec(),
            results: results.to_vec(),
        }
    }

    #[test]
    fn test_single_parameter() {
        let got = resolve_positions(Lengths::new(false, 1, 0), &[true]).unwrap();
        assert_eq!(got, split(false, &[0], &[]));
    }

    #[test]
    fn test_receiver_offsets_parameters() {
        // (w *Writer) Write(p []byte) (n int, err error)
        let lengths = Lengths::new(true, 1, 2);
        let got = resolve_positions(lengths, &[true, true, false, true]).unwrap();
        assert_eq!(got, split(true, &[0], &[1]));
    }

    #[test]
    fn test_length_mismatch() {
        let err = resolve_positions(Lengths::new(true, 1, 0), &[true]).unwrap_err();
        assert!(matches!(
            err,
            Error::PositionLengthMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_count_matches_popcount_for_every_bitmap() {
        for lengths in [
            Lengths::new(true, 2, 2),
            Lengths::new(false, 3, 1),
            Lengths::new(true, 0, 3),
        ] {
            let n = lengths.total();
            for bits in 0u32..(1 << n) {
                let pos: Vec<bool> = (0..n).map(|i| bits & (1 << i) != 0).collect();
                let got = resolve_positions(lengths, &pos).unwrap();
                assert_eq!(got.len(), bits.count_ones() as usize);
                assert!(got.params.iter().all(|&i| i < lengths.params));
                assert!(got.results.iter().all(|&i| i < lengths.results));
                assert!(!got.receiver || lengths.has_receiver);
            }
        }
    }

    #[test]
    fn test_variadic_last_parameter() {
        // func Join(sep string, elems ...string) string
        let lengths = Lengths::new(false, 2, 1);
        let got = resolve_positions(lengths, &[false, true, false]).unwrap();
        assert_eq!(got.params, vec![1]);

        let matches = got.param_matches(true, lengths.params);
        assert_eq!(matches, vec![ParamMatch::AtLeast(1)]);
        assert!(!matches[0].matches(0));
        assert!(matches[0].matches(1));
        assert!(matches[0].matches(4));

        // Not variadic: exact
        assert_eq!(
            got.param_matches(false, lengths.params),
            vec![ParamMatch::Exact(1)]
        );
    }

    #[test]
    fn test_flow_block() {
        let lengths = Lengths::new(true, 1, 1);
        let block = FlowBlock::new(vec![false, true, false], vec![true, false, true]);
        let (inp, out) = resolve_flow_block(lengths, &block).unwrap();
        assert_eq!(inp, split(false, &[0], &[]));
        assert_eq!(out, split(true, &[], &[0]));
    }

    #[test]
    fn test_resolve_against_callable() {
        use selspec_meta::{Func, Param, Receiver, TypeMethod};

        let param = |name: &str, ty: &str| Param::new(name, ty, "basic");
        // func (w *Writer) Write(p []byte) (n int, err error)
        let write = TypeMethod {
            id: "Writer.Write".into(),
            receiver: Receiver {
                name: "w".into(),
                type_id: "Writer".into(),
                type_string: "*Writer".into(),
                kind: "pointer".into(),
            },
            func: Func {
                id: "Writer.Write".into(),
                name: "Write".into(),
                pkg_path: "example.com/io".into(),
                params: vec![param("p", "[]byte")],
                results: vec![param("n", "int"), param("err", "error")],
                variadic: false,
                doc: None,
                span: None,
            },
        };

        let got = resolve_callable(&write, &[false, true, false, true]).unwrap();
        assert_eq!(got, split(false, &[0], &[1]));

        // The bare function has no receiver slot
        let got = resolve_callable(&write.func, &[true, false, true]).unwrap();
        assert_eq!(got, split(false, &[0], &[1]));

        assert!(matches!(
            resolve_callable(&write.func, &[true, false, true, false]),
            Err(Error::PositionLengthMismatch {
                expected: 3,
                found: 4
            })
        ));
    }
}
