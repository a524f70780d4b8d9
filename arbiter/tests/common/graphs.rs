use arbiter::concepts::topology::Topology;

/// 0 - 1 - 2 - 3 - 0
pub fn square() -> Topology {
    Topology::new(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]).unwrap()
}

/// two disjoint paths 0-1-3 and 0-2-3, only 0 and 3 terminate flows
pub fn ring_ecmp() -> Topology {
    Topology::with_endpoints(4, &[(0, 1), (0, 2), (1, 3), (2, 3)], &[0, 3]).unwrap()
}

pub fn line(n: u32) -> Topology {
    let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
    Topology::new(n as usize, &edges).unwrap()
}

/// 0-1 and 2-3, nothing in between
pub fn split() -> Topology {
    Topology::new(4, &[(0, 1), (2, 3)]).unwrap()
}

/// spines 0, 1; leaves 2, 3, 4; servers 5..=10, two per leaf
pub fn leaf_spine() -> Topology {
    Topology::with_endpoints(
        11,
        &[
            (0, 2), (0, 3), (0, 4),
            (1, 2), (1, 3), (1, 4),
            (2, 5), (2, 6),
            (3, 7), (3, 8),
            (4, 9), (4, 10),
        ],
        &[5, 6, 7, 8, 9, 10],
    )
    .unwrap()
}

/// 3x3 grid, plenty of equal-cost paths
pub fn grid() -> Topology {
    let mut edges = Vec::new();
    for r in 0..3u32 {
        for c in 0..3u32 {
            let id = r * 3 + c;
            if c < 2 {
                edges.push((id, id + 1));
            }
            if r < 2 {
                edges.push((id, id + 3));
            }
        }
    }
    Topology::new(9, &edges).unwrap()
}

pub fn all() -> Vec<(&'static str, Topology)> {
    vec![
        ("square", square()),
        ("ring_ecmp", ring_ecmp()),
        ("line", line(6)),
        ("split", split()),
        ("leaf_spine", leaf_spine()),
        ("grid", grid()),
    ]
}
