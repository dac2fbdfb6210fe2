//! Combining ancestor-side and descendant-side per-token visibility into a
//! single flat upload list.

use crate::seed::SeedMap;
use crate::types::UploadMeta;

/// Combine the ancestor and descendant seed maps nearest to some query
/// commit into its full visible-upload list.
///
/// `ancestor` is `Some((map, distance))` if a seed ancestor was found (the
/// map is the seed's own per-token map, `distance` the number of edges from
/// the query commit to that seed); `None` if the walk ran off the root of
/// the graph. `descendant` is the symmetric value for the nearest seed
/// descendant.
///
/// Output ordering is not significant; callers that need a canonical order
/// (tests, snapshots) should sort on upload id afterward.
pub fn combine(
    ancestor: Option<(&SeedMap, u64)>,
    descendant: Option<(&SeedMap, u64)>,
) -> Vec<UploadMeta> {
    let mut result = Vec::new();

    if let Some((ancestor_map, d_a)) = ancestor {
        for (token, a_meta) in ancestor_map {
            let u_a = a_meta.for_ancestor_output(d_a);

            match descendant.and_then(|(descendant_map, d_d)| descendant_map.get(token).map(|d_meta| (d_meta, d_d))) {
                Some((d_meta, d_d)) => {
                    let u_d = d_meta.for_descendant_output(d_d);
                    if u_d.tie_break_key() < u_a.tie_break_key() {
                        result.push(u_d);
                        result.push(u_a.with_overwritten());
                    } else {
                        result.push(u_a);
                    }
                }
                None => result.push(u_a),
            }
        }
    }

    if let Some((descendant_map, d_d)) = descendant {
        let already_covered = |token: &crate::types::Token| -> bool {
            ancestor.is_some_and(|(ancestor_map, _)| ancestor_map.contains_key(token))
        };
        for (token, d_meta) in descendant_map {
            if already_covered(token) {
                continue;
            }
            result.push(d_meta.for_descendant_output(d_d));
        }
    }

    result
}
