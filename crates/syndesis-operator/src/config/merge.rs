use std::collections::BTreeMap;

pub use syndesis_operator_derive::Merge;

/// A type that can be merged with itself
///
/// Configuration is assembled from several layers (template file, persisted secret, environment, custom resource).
/// Each layer is a sparse fragment, and a later layer is merged *onto* the accumulated configuration, so that every
/// value the later layer sets wins.
///
/// Most users will want to implement this for custom types using [the associated derive macro](`derive@Merge`).
///
/// # Example
///
/// ```
/// # use syndesis_operator::config::merge::{Merge, merge};
///
/// #[derive(Merge, Debug, PartialEq, Eq)]
/// struct Database {
///     image: Option<String>,
///     user: Option<String>,
/// }
///
/// let template = Database {
///     image: Some("postgresql:9.6".to_string()),
///     user: Some("syndesis".to_string()),
/// };
/// let environment = Database {
///     image: Some("postgresql:12".to_string()),
///     user: None,
/// };
/// assert_eq!(merge(environment, &template), Database {
///     image: Some("postgresql:12".to_string()), // Set by the overlay
///     user: Some("syndesis".to_string()),       // Not set by the overlay, kept from the template
/// });
/// ```
///
/// # Options
///
/// A field should be [`Option`]al if it is [`Atomic`] (for example: [`String`]), so that "not set" can be told apart
/// from an explicit zero value such as `false` or `0`.
/// Composite objects (such as regular structs) should generally *not* be optional.
pub trait Merge {
    /// Merge with `defaults`, preferring values from `self` if they are set there
    fn merge(&mut self, defaults: &Self);
}

impl<T: Merge> Merge for Box<T> {
    fn merge(&mut self, defaults: &Self) {
        T::merge(self, defaults);
    }
}

/// Moving version of [`Merge::merge`]
///
/// Reads as "`overlay` on top of `base`": every value set in `overlay` wins, everything else is taken from `base`.
pub fn merge<T: Merge>(mut overlay: T, base: &T) -> T {
    overlay.merge(base);
    overlay
}

/// Composable version of [`Merge::merge`] that allows folding a sequence of layers
///
/// Example:
///
/// ```
/// use syndesis_operator::config::merge::{Merge, chainable_merge};
/// #[derive(Clone, Default, Merge, PartialEq)]
/// struct Features {
///     integration_limit: Option<i32>,
/// }
///
/// let mut template = Some(Features { integration_limit: Some(0) });
/// let mut environment = None;
/// let mut custom_resource = Some(Features { integration_limit: Some(5) });
///
/// let merged = [template.as_mut(), environment.as_mut(), custom_resource.as_mut()]
///     .into_iter()
///     .flatten()
///     .reduce(|base, overlay| chainable_merge(overlay, base));
///
/// assert_eq!(5, merged.unwrap().integration_limit.unwrap());
/// ```
pub fn chainable_merge<'a, T: Merge + Clone>(this: &'a mut T, defaults: &T) -> &'a mut T {
    this.merge(defaults);
    this
}

/// A marker trait for types that are merged atomically (as one single value) rather than
/// trying to merge each field individually
pub trait Atomic: Clone {}
impl Atomic for u16 {}
impl Atomic for u32 {}
impl Atomic for u64 {}
impl Atomic for i32 {}
impl Atomic for i64 {}
impl Atomic for bool {}
impl Atomic for String {}
impl Atomic for &str {}
// A list of image pull secrets is replaced as a whole
impl Atomic for Vec<String> {}
// Maven repositories and volume labels are replaced as a whole, never merged key by key
impl Atomic for BTreeMap<String, String> {}

impl<T: Atomic> Merge for Option<T> {
    fn merge(&mut self, defaults: &Self) {
        if self.is_none() {
            self.clone_from(defaults);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use super::{Merge, chainable_merge, merge};

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Accumulator(u8);
    impl Merge for Accumulator {
        fn merge(&mut self, defaults: &Self) {
            self.0 += defaults.0;
        }
    }

    #[derive(Merge, PartialEq, Eq, Debug, Clone, Default)]
    #[merge(path_overrides(merge = "super"))]
    struct Volume {
        capacity: Option<String>,
        access_mode: Option<String>,
    }

    #[derive(Merge, PartialEq, Eq, Debug, Clone, Default)]
    #[merge(path_overrides(merge = "super"))]
    struct Database {
        image: Option<String>,
        exporter_enabled: Option<bool>,
        volume: Volume,
    }

    #[rstest]
    #[case::overlay_unset(None, Some(false), Some(false))]
    #[case::overlay_false_wins_over_true(Some(false), Some(true), Some(false))]
    #[case::overlay_true_wins_over_unset(Some(true), None, Some(true))]
    #[case::both_unset(None, None, None)]
    fn merge_option_is_presence_based(
        #[case] overlay: Option<bool>,
        #[case] base: Option<bool>,
        #[case] expected: Option<bool>,
    ) {
        assert_eq!(merge(overlay, &base), expected);
    }

    #[test]
    fn merge_derived_struct() {
        assert_eq!(
            merge(
                Database {
                    image: Some("postgresql:12".to_string()),
                    ..Default::default()
                },
                &Database {
                    image: Some("postgresql:9.6".to_string()),
                    exporter_enabled: Some(true),
                    volume: Volume::default(),
                }
            ),
            Database {
                image: Some("postgresql:12".to_string()),
                exporter_enabled: Some(true),
                volume: Volume::default(),
            }
        );
    }

    #[test]
    fn merge_nested_derived_struct() {
        assert_eq!(
            merge(
                Database {
                    volume: Volume {
                        capacity: None,
                        access_mode: Some("ReadWriteMany".to_string()),
                    },
                    ..Default::default()
                },
                &Database {
                    image: Some("postgresql:9.6".to_string()),
                    exporter_enabled: None,
                    volume: Volume {
                        capacity: Some("1Gi".to_string()),
                        access_mode: Some("ReadWriteOnce".to_string()),
                    },
                },
            ),
            Database {
                image: Some("postgresql:9.6".to_string()),
                exporter_enabled: None,
                volume: Volume {
                    capacity: Some("1Gi".to_string()),
                    access_mode: Some("ReadWriteMany".to_string()),
                },
            }
        );
    }

    #[test]
    fn merge_empty_overlay_is_identity() {
        let base = Database {
            image: Some("postgresql:9.6".to_string()),
            exporter_enabled: Some(false),
            volume: Volume {
                capacity: Some("1Gi".to_string()),
                access_mode: None,
            },
        };
        assert_eq!(merge(Database::default(), &base), base);
    }

    #[test]
    fn merge_derived_tuple_struct() {
        #[derive(Merge, PartialEq, Eq, Debug)]
        #[merge(path_overrides(merge = "super"))]
        struct Mergeable(Option<u16>, Option<u32>);

        assert_eq!(
            merge(Mergeable(Some(1), None), &Mergeable(Some(2), Some(3))),
            Mergeable(Some(1), Some(3))
        );
    }

    #[test]
    fn merge_derived_struct_with_generics() {
        #[derive(Merge, PartialEq, Eq, Debug)]
        #[merge(bound = "B: Merge", path_overrides(merge = "super"))]
        struct Mergeable<'a, B> {
            one: Option<&'a str>,
            two: B,
        }

        assert_eq!(
            merge(
                Mergeable {
                    one: None,
                    two: Accumulator(1),
                },
                &Mergeable {
                    one: Some("abc"),
                    two: Accumulator(2),
                },
            ),
            Mergeable {
                one: Some("abc"),
                two: Accumulator(3),
            }
        );
    }

    #[test]
    fn merge_map_is_atomic() {
        let overlay = Some(BTreeMap::from([(
            "central".to_string(),
            "https://repo1.maven.org/maven2/".to_string(),
        )]));
        let base = Some(BTreeMap::from([
            (
                "central".to_string(),
                "https://repo.maven.apache.org/maven2/".to_string(),
            ),
            (
                "repo-02-redhat-ga".to_string(),
                "https://maven.repository.redhat.com/ga/".to_string(),
            ),
        ]));
        assert_eq!(merge(overlay.clone(), &base), overlay);
    }

    #[test]
    fn chainable_merge_folds_layers_in_order() {
        let mut template = Volume {
            capacity: Some("1Gi".to_string()),
            access_mode: Some("ReadWriteOnce".to_string()),
        };
        let mut environment = Volume {
            capacity: None,
            access_mode: Some("ReadWriteMany".to_string()),
        };
        let mut custom_resource = Volume {
            capacity: Some("5Gi".to_string()),
            access_mode: None,
        };

        let merged = [&mut template, &mut environment, &mut custom_resource]
            .into_iter()
            .reduce(|base, overlay| chainable_merge(overlay, base))
            .cloned();

        assert_eq!(
            merged,
            Some(Volume {
                capacity: Some("5Gi".to_string()),
                access_mode: Some("ReadWriteMany".to_string()),
            })
        );
    }
}
