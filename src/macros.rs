//! Macros for declaring screens and blocks.
//!
//! - `screen!`: declare a screen marker and the operations chainable on it
//! - `steps!`: literal form of a sequential block

/// Declare a screen marker type, optionally with screen-scoped operations.
///
/// # Generated Code
///
/// - A zero-sized `$name` marker implementing [`Screen`](crate::Screen)
/// - With a body: a `{Name}Actions<D>` trait holding the listed operations,
///   implemented only for `Step<D, $name>`
///
/// # Example
///
/// ```
/// use wraith::{screen, text_fields, buttons, Step};
///
/// screen!(pub Dashboard);
///
/// screen! {
///     pub Login<D> {
///         fn sign_in(self, user: &str) -> Step<D, Dashboard> {
///             self.then(text_fields().first().tap().type_text(user))
///                 .then(buttons().label_containing("Sign in").only_element().tap())
///                 .discard()
///                 .haunt()
///         }
///     }
/// }
/// ```
///
/// Operations of one screen are not available on another:
///
/// ```compile_fail
/// use wraith::{fake::FakeDriver, screen, Step};
///
/// screen!(pub Dashboard);
/// screen! {
///     pub Login<D> {
///         fn sign_in(self) -> Step<D, Dashboard> {
///             self.discard().haunt()
///         }
///     }
/// }
///
/// let on_dashboard: Step<FakeDriver, Dashboard> = Step::enter();
/// let _ = on_dashboard.sign_in();
/// ```
#[macro_export]
macro_rules! screen {
    ($(#[$meta:meta])* $vis:vis $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::Screen for $name {
            const NAME: &'static str = stringify!($name);
        }
    };

    (
        $(#[$meta:meta])* $vis:vis $name:ident <$d:ident> {
            $(
                $(#[$fn_meta:meta])*
                fn $fn_name:ident ($self:tt $(, $arg:ident : $arg_ty:ty)*) -> $ret:ty $body:block
            )*
        }
    ) => {
        $crate::screen!($(#[$meta])* $vis $name);

        $crate::paste::paste! {
            #[doc = concat!("Operations chainable while on [`", stringify!($name), "`].")]
            $vis trait [<$name Actions>]<$d: $crate::Driver + 'static> {
                $(
                    $(#[$fn_meta])*
                    fn $fn_name($self $(, $arg: $arg_ty)*) -> $ret;
                )*
            }

            impl<$d: $crate::Driver + 'static> [<$name Actions>]<$d> for $crate::Step<$d, $name> {
                $(
                    fn $fn_name($self $(, $arg: $arg_ty)*) -> $ret $body
                )*
            }
        }
    };
}

/// Run steps in order, stopping at the first failure.
///
/// `steps![a, b, c]` is [`sequence`](crate::block::sequence) over the listed
/// `Step<D, ()>` values; `steps![]` succeeds without touching the driver.
#[macro_export]
macro_rules! steps {
    ($($step:expr),* $(,)?) => {
        $crate::block::sequence(::std::vec![$($step),*])
    };
}
