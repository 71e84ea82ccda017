use foundation::bounds::GeoBounds;
use foundation::math::precision::stable_total_cmp_f64;

/// A deterministic bounding volume hierarchy over longitude/latitude boxes.
///
/// Ordering contract:
/// - `query` returns keys in ascending order.
///
/// Items must not cross the antimeridian; callers split such boxes first.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
    len: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        bounds: GeoBounds,
        items: Vec<Item>,
    },
    Internal {
        bounds: GeoBounds,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Item {
    pub key: u32,
    pub bounds: GeoBounds,
}

impl Bvh {
    pub fn build(items: Vec<Item>) -> Self {
        let mut nodes = Vec::new();
        let mut items = items;
        let len = items.len();
        if !items.is_empty() {
            let _root = build_node(&mut nodes, &mut items);
        }
        Self { nodes, len }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Keys of items whose bounds intersect `query`, ascending.
    pub fn query(&self, query: &GeoBounds) -> Vec<u32> {
        if self.nodes.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<u32> = Vec::new();
        let mut stack: Vec<usize> = vec![0];

        while let Some(idx) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { bounds, items } => {
                    if !bounds.intersects(query) {
                        continue;
                    }
                    hits.extend(
                        items
                            .iter()
                            .filter(|item| item.bounds.intersects(query))
                            .map(|item| item.key),
                    );
                }
                Node::Internal {
                    bounds,
                    left,
                    right,
                } => {
                    if !bounds.intersects(query) {
                        continue;
                    }
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }

        hits.sort_unstable();
        hits.dedup();
        hits
    }
}

const LEAF_MAX: usize = 8;

fn build_node(nodes: &mut Vec<Node>, items: &mut [Item]) -> usize {
    let bounds = bounds_for_items(items);
    if items.len() <= LEAF_MAX {
        let idx = nodes.len();
        nodes.push(Node::Leaf {
            bounds,
            items: items.to_vec(),
        });
        return idx;
    }

    // Split along the wider extent; longitude wins ties.
    let along_lon = bounds.width() >= bounds.height();
    items.sort_by(|a, b| {
        let ca = centroid(&a.bounds, along_lon);
        let cb = centroid(&b.bounds, along_lon);
        stable_total_cmp_f64(ca, cb).then_with(|| a.key.cmp(&b.key))
    });

    let mid = items.len() / 2;
    let (left_items, right_items) = items.split_at_mut(mid);

    let idx = nodes.len();
    // Placeholder; patched after children are built.
    nodes.push(Node::Leaf {
        bounds,
        items: Vec::new(),
    });

    let left = build_node(nodes, left_items);
    let right = build_node(nodes, right_items);

    nodes[idx] = Node::Internal {
        bounds,
        left,
        right,
    };
    idx
}

fn centroid(b: &GeoBounds, along_lon: bool) -> f64 {
    let [lon, lat] = b.center();
    if along_lon { lon } else { lat }
}

fn bounds_for_items(items: &[Item]) -> GeoBounds {
    items[1..]
        .iter()
        .fold(items[0].bounds, |acc, item| acc.union(&item.bounds))
}

#[cfg(test)]
mod tests {
    use super::{Bvh, Item};
    use foundation::bounds::GeoBounds;

    fn item(key: u32, west: f64, south: f64, east: f64, north: f64) -> Item {
        Item {
            key,
            bounds: GeoBounds::new(west, south, east, north),
        }
    }

    #[test]
    fn query_returns_keys_in_order() {
        let bvh = Bvh::build(vec![
            item(2, 10.0, 0.0, 11.0, 1.0),
            item(1, 0.0, 0.0, 1.0, 1.0),
            item(3, 0.5, 0.5, 2.0, 2.0),
        ]);

        let hits = bvh.query(&GeoBounds::new(0.25, 0.25, 1.5, 1.5));
        assert_eq!(hits, vec![1, 3]);
    }

    #[test]
    fn deep_trees_match_linear_scan() {
        let items: Vec<Item> = (0..100)
            .map(|i| {
                let lon = (i % 10) as f64 * 10.0 - 50.0;
                let lat = (i / 10) as f64 * 5.0 - 25.0;
                item(i, lon, lat, lon + 2.0, lat + 2.0)
            })
            .collect();
        let q = GeoBounds::new(-21.0, -11.0, 15.0, 3.0);

        let mut expected: Vec<u32> = items
            .iter()
            .filter(|i| i.bounds.intersects(&q))
            .map(|i| i.key)
            .collect();
        expected.sort_unstable();

        let bvh = Bvh::build(items);
        assert_eq!(bvh.len(), 100);
        assert_eq!(bvh.query(&q), expected);
    }

    #[test]
    fn empty_tree_has_no_hits() {
        let bvh = Bvh::build(Vec::new());
        assert!(bvh.is_empty());
        assert!(bvh.query(&GeoBounds::new(-180.0, -90.0, 180.0, 90.0)).is_empty());
    }
}
