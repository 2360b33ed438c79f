//! Expansion of fixed-function topologies into the list topologies wgpu draws.

use crate::render::PrimitiveType;

/// wgpu list topology a batch is drawn with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum TopologyClass {
    Points,
    Lines,
    Triangles,
}

impl TopologyClass {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            TopologyClass::Points => wgpu::PrimitiveTopology::PointList,
            TopologyClass::Lines => wgpu::PrimitiveTopology::LineList,
            TopologyClass::Triangles => wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// Appends to `out` the source indices that draw `count` vertices of
/// `primitive` as a list topology, and returns that topology.
///
/// Trailing vertices that do not complete a primitive are dropped.
pub(crate) fn expand(
    primitive: PrimitiveType,
    count: usize,
    out: &mut Vec<usize>,
) -> TopologyClass {
    match primitive {
        PrimitiveType::Points => {
            out.extend(0..count);
            TopologyClass::Points
        }
        PrimitiveType::Lines => {
            out.extend(0..count - count % 2);
            TopologyClass::Lines
        }
        PrimitiveType::LineStrip => {
            for i in 1..count {
                out.extend([i - 1, i]);
            }
            TopologyClass::Lines
        }
        PrimitiveType::Triangles => {
            out.extend(0..count - count % 3);
            TopologyClass::Triangles
        }
        PrimitiveType::TriangleStrip => {
            for i in 2..count {
                // Odd triangles swap their first two vertices to keep winding.
                if i % 2 == 0 {
                    out.extend([i - 2, i - 1, i]);
                } else {
                    out.extend([i - 1, i - 2, i]);
                }
            }
            TopologyClass::Triangles
        }
        PrimitiveType::TriangleFan => {
            for i in 2..count {
                out.extend([0, i - 1, i]);
            }
            TopologyClass::Triangles
        }
        PrimitiveType::Quads => {
            for q in (0..count / 4).map(|q| q * 4) {
                out.extend([q, q + 1, q + 2, q, q + 2, q + 3]);
            }
            TopologyClass::Triangles
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(primitive: PrimitiveType, count: usize) -> (TopologyClass, Vec<usize>) {
        let mut out = Vec::new();
        let class = expand(primitive, count, &mut out);
        (class, out)
    }

    #[test]
    fn lists_pass_through_complete_primitives() {
        assert_eq!(run(PrimitiveType::Points, 3), (TopologyClass::Points, vec![0, 1, 2]));
        assert_eq!(run(PrimitiveType::Lines, 5), (TopologyClass::Lines, vec![0, 1, 2, 3]));
        assert_eq!(run(PrimitiveType::Triangles, 7).1, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn line_strip_becomes_segments() {
        assert_eq!(
            run(PrimitiveType::LineStrip, 4),
            (TopologyClass::Lines, vec![0, 1, 1, 2, 2, 3])
        );
        assert!(run(PrimitiveType::LineStrip, 1).1.is_empty());
    }

    #[test]
    fn triangle_strip_keeps_winding() {
        assert_eq!(
            run(PrimitiveType::TriangleStrip, 5).1,
            vec![0, 1, 2, 2, 1, 3, 2, 3, 4]
        );
    }

    #[test]
    fn fan_shares_first_vertex() {
        assert_eq!(run(PrimitiveType::TriangleFan, 5).1, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    #[test]
    fn quads_split_into_two_triangles() {
        let (class, indices) = run(PrimitiveType::Quads, 9);
        assert_eq!(class, TopologyClass::Triangles);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn short_batches_produce_nothing() {
        assert!(run(PrimitiveType::Triangles, 2).1.is_empty());
        assert!(run(PrimitiveType::TriangleFan, 2).1.is_empty());
        assert!(run(PrimitiveType::Quads, 3).1.is_empty());
        assert!(run(PrimitiveType::Lines, 0).1.is_empty());
    }
}
