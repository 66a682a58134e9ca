use super::VoxelGeometry;
use crate::prelude_crate::*;
use std::io::BufRead;

/// Consumes `nx` slices of `ny * nz` whitespace-separated tags, one line at a
/// time. Lines past the last slice are not read.
pub(super) fn parse_slices<R>(mut source: R, n: [usize; 3]) -> LbResult<VoxelGeometry>
where
    R: BufRead,
{
    let [nx, ny, nz] = n;
    let slice_size = ny * nz;
    let num_nodes = nx * slice_size;
    let mut node_types = Vec::with_capacity(num_nodes);
    let mut line = String::new();
    while node_types.len() < num_nodes {
        line.clear();
        if source.read_line(&mut line)? == 0 {
            break;
        }
        for token in line.split_whitespace() {
            if node_types.len() == num_nodes {
                break;
            }
            node_types.push(parse_tag(token, node_types.len() / slice_size.max(1))?);
        }
    }
    if node_types.len() < num_nodes {
        return Err(LbError::TruncatedGeometry {
            expected: nx,
            found: node_types.len() / slice_size.max(1),
        });
    }
    VoxelGeometry::new(n, node_types)
}

fn parse_tag(token: &str, slice: usize) -> LbResult<NodeType> {
    token
        .parse::<i64>()
        .ok()
        .and_then(|value| NodeType::try_from(value).ok())
        .ok_or_else(|| LbError::InvalidTag {
            value: token.to_string(),
            slice,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_layout_whitespace() {
        let geometry = parse_slices("0 1 0\t1\n\n\n2 2\r\n0 0".as_bytes(), [2, 2, 2]).unwrap();

        assert_eq!(geometry.count(Fluid), 4);
        assert_eq!(geometry.count(Solid), 2);
        assert_eq!(geometry.count(Inactive), 2);
    }

    #[test]
    fn test_parse_ignores_trailing_tokens() {
        let geometry = parse_slices("0 0 0 0 1 1 1 1 9 9".as_bytes(), [2, 2, 1]).unwrap();

        assert_eq!(geometry.get_node_type(1, 1, 0), Fluid);
        assert_eq!(geometry.count(Solid), 0);
    }

    #[test]
    fn test_parse_stops_after_last_slice() {
        let source = &b"1 1\n0 0\n\n\xff\xfe not utf-8\n"[..];

        let geometry = parse_slices(source, [1, 2, 2]).unwrap();

        assert_eq!(geometry.count(Solid), 2);
    }

    #[test]
    fn test_parse_reports_slice_of_invalid_tag() {
        let result = parse_slices("0 0\n0 0\n\n0 0\n0 -1\n".as_bytes(), [2, 2, 2]);

        assert!(matches!(result, Err(LbError::InvalidTag { slice: 1, .. })));
    }

    #[test]
    fn test_parse_rejects_non_integer_tags() {
        let result = parse_slices("0 0.5 0 0".as_bytes(), [1, 2, 2]);

        assert!(matches!(result, Err(LbError::InvalidTag { slice: 0, .. })));
    }

    #[test]
    fn test_parse_empty_source() {
        let result = parse_slices("".as_bytes(), [4, 2, 2]);

        assert!(matches!(
            result,
            Err(LbError::TruncatedGeometry {
                expected: 4,
                found: 0
            })
        ));
    }
}
