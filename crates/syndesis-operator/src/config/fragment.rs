//! Fragments are partially specified parts of the operator configuration. For example, mandatory values may be missing.
//! Fragments may be [`validate`]d and turned into their ["full"](`FromFragment`) type.
//!
//! Fragment types are typically generated using the [`#[derive(Fragment)]`](`derive@Fragment`) macro.
use std::fmt::{Display, Write};

use snafu::Snafu;

use super::merge::Atomic;

#[cfg(doc)]
use super::merge::Merge;

pub use syndesis_operator_derive::Fragment;

/// Contains context used for generating validation errors
///
/// Constructed internally in [`validate`]
pub struct Validator<'a> {
    ident: Option<&'a dyn Display>,
    parent: Option<&'a Validator<'a>>,
}

impl Validator<'_> {
    /// Creates a `Validator` for a subfield of the current object
    pub fn field<'b>(&'b self, ident: &'b dyn Display) -> Validator<'b> {
        Validator {
            ident: Some(ident),
            parent: Some(self),
        }
    }

    fn error_problem(self, problem: ValidationProblem) -> ValidationError {
        let mut idents = Vec::new();
        let mut curr = Some(&self);
        while let Some(curr_some) = curr {
            if let Some(ident) = curr_some.ident {
                idents.push(ident.to_string());
            }
            curr = curr_some.parent;
        }
        ValidationError {
            path: FieldPath { idents },
            problem,
        }
    }

    /// Returns an error indicating that the `Validator` refers to a required field that is currently not provided
    pub fn error_required(self) -> ValidationError {
        self.error_problem(ValidationProblem::FieldRequired)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct FieldPath {
    idents: Vec<String>,
}
impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, ident) in self.idents.iter().rev().enumerate() {
            if i > 0 {
                f.write_char('.')?;
            }
            f.write_str(ident)?;
        }
        Ok(())
    }
}

/// An error that occurred when validating an object.
///
/// It is constructed by calling one of the `error_*` methods on [`Validator`], such as [`Validator::error_required`].
#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(display("failed to validate {path}"))]
pub struct ValidationError {
    path: FieldPath,
    #[snafu(source)]
    problem: ValidationProblem,
}

impl ValidationError {
    /// The dotted path of the offending field, starting at the validated root
    pub fn path(&self) -> String {
        self.path.to_string()
    }
}

/// A problem that was discovered during validation, with no additional context.
#[derive(Debug, PartialEq, Eq, Snafu)]
enum ValidationProblem {
    #[snafu(display("field is required"))]
    FieldRequired,
}

/// A type that can be constructed by validating a "fragment" type.
///
/// This is intended to be used together with [`Merge`]: every configuration layer is deserialized into a fragment,
/// the fragments are merged in precedence order, and the result is validated into the type implementing
/// `FromFragment`.
///
/// This will typically be derived using the [`Fragment`] macro, rather than implemented manually.
pub trait FromFragment: Sized {
    /// The fragment type of `Self`.
    ///
    /// For [`Atomic`] types this should be [`Option`](`Option<Self>`).
    ///
    /// For complex structs, this should be a variant of `Self` where each field is replaced by its respective `Fragment` type. This can be derived using
    /// [`Fragment`].
    type Fragment;
    /// A variant of [`Self::Fragment`] that is used when the container already indicates that a value is optional.
    ///
    /// For [`Atomic`]s this will typically be `Self`. For complex structs this will typically be [`Self::Fragment`].
    type RequiredFragment: Into<Self::Fragment>;

    /// Try to validate a [`Self::Fragment`] into `Self`.
    ///
    /// `validator` contains additional error reporting context, such as the path to the field from the root fragment. It is created by
    /// [`validate`].
    fn from_fragment(
        fragment: Self::Fragment,
        validator: Validator,
    ) -> Result<Self, ValidationError>;
}
impl<T: Atomic> FromFragment for T {
    type Fragment = Option<T>;
    type RequiredFragment = T;

    fn from_fragment(
        fragment: Self::Fragment,
        validator: Validator,
    ) -> Result<Self, ValidationError> {
        fragment.ok_or_else(|| validator.error_required())
    }
}
impl<T: FromFragment> FromFragment for Option<T> {
    type Fragment = Option<T::RequiredFragment>;
    type RequiredFragment = Option<T::RequiredFragment>;

    fn from_fragment(
        fragment: Self::Fragment,
        validator: Validator,
    ) -> Result<Self, ValidationError> {
        if let Some(fragment) = fragment {
            T::from_fragment(fragment.into(), validator).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Like [`FromFragment::from_fragment`], but an entirely unset fragment validates to `T::default()`.
///
/// Used by `#[fragment(default)]` fields.
pub fn from_fragment_or_default<T>(
    fragment: T::Fragment,
    validator: Validator,
) -> Result<T, ValidationError>
where
    T: FromFragment + Default,
    T::Fragment: Default + PartialEq,
{
    if fragment == T::Fragment::default() {
        Ok(T::default())
    } else {
        T::from_fragment(fragment, validator)
    }
}

/// Validates a [`Fragment`](`FromFragment::Fragment`), and turns it into its corresponding [`FromFragment`] type if successful.
pub fn validate<T: FromFragment>(fragment: T::Fragment) -> Result<T, ValidationError> {
    T::from_fragment(
        fragment,
        Validator {
            ident: None,
            parent: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::{Fragment, validate};
    use crate::config::merge::Merge;

    #[derive(Fragment, Debug, PartialEq, Eq)]
    #[fragment(path_overrides(fragment = "super"))]
    #[fragment_attrs(derive(Debug))]
    struct Empty {}

    #[derive(Fragment, Debug, Default, PartialEq, Eq)]
    #[fragment(path_overrides(fragment = "super"))]
    #[fragment_attrs(derive(Debug, Default, PartialEq, Eq))]
    /// Container image and sizing of a component
    struct Component {
        image: String,
        #[fragment(default)]
        replicas: u16,
        memory: Option<String>,
    }

    #[derive(Fragment, Debug, PartialEq, Eq)]
    #[fragment(path_overrides(fragment = "super"))]
    #[fragment_attrs(derive(Debug, Default, PartialEq, Eq))]
    struct Components {
        server: Component,
        #[fragment(default)]
        grafana: Component,
    }

    #[derive(Fragment, Debug, PartialEq, Eq)]
    #[fragment(path_overrides(fragment = "super"))]
    #[fragment_attrs(derive(Debug, Default, Merge), merge(path_overrides(merge = "crate::config::merge")))]
    struct Mergeable {
        image: String,
    }

    #[test]
    fn validate_empty() {
        assert_eq!(validate::<Empty>(EmptyFragment {}).unwrap(), Empty {});
    }

    #[test]
    fn validate_basics() {
        assert_eq!(
            validate::<Component>(ComponentFragment {
                image: Some("docker.io/syndesis/syndesis-server:latest".to_string()),
                replicas: Some(2),
                memory: Some("800Mi".to_string()),
            })
            .unwrap(),
            Component {
                image: "docker.io/syndesis/syndesis-server:latest".to_string(),
                replicas: 2,
                memory: Some("800Mi".to_string()),
            }
        );

        let err = validate::<Component>(ComponentFragment::default()).unwrap_err();
        assert_eq!(err.path(), "image");
        assert!(err.to_string().contains("image"));
    }

    #[test]
    fn validate_default_fields() {
        let component = validate::<Component>(ComponentFragment {
            image: Some("docker.io/syndesis/syndesis-ui:latest".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(component.replicas, 0);
        assert_eq!(component.memory, None);
    }

    #[test]
    fn validate_nested() {
        let err = validate::<Components>(ComponentsFragment::default()).unwrap_err();
        assert_eq!(err.path(), "server.image");

        // an entirely unset defaulted struct is accepted, a partially set one is still checked
        let components = validate::<Components>(ComponentsFragment {
            server: ComponentFragment {
                image: Some("server".to_string()),
                ..Default::default()
            },
            grafana: ComponentFragment::default(),
        })
        .unwrap();
        assert_eq!(components.grafana, Component::default());

        let err = validate::<Components>(ComponentsFragment {
            server: ComponentFragment {
                image: Some("server".to_string()),
                ..Default::default()
            },
            grafana: ComponentFragment {
                memory: Some("512Mi".to_string()),
                ..Default::default()
            },
        })
        .unwrap_err();
        assert_eq!(err.path(), "grafana.image");
    }

    #[test]
    fn forwarded_derives_apply_to_fragment() {
        let mut overlay = MergeableFragment { image: None };
        overlay.merge(&MergeableFragment {
            image: Some("base".to_string()),
        });
        assert_eq!(overlay.image.as_deref(), Some("base"));
    }
}
