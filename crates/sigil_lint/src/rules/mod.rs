//! Built-in lint rules.
//!
//! Every rule is an independent, side-effect-free predicate over (node
//! shape, resolved handle, current scope frame). Rules read tracker and
//! stack state through [`crate::rule::AnalysisView`] and never mutate it.

mod handle_naming;
mod no_handle_alias;
mod no_peek_in_markup;
mod no_render_creation;
mod no_render_mutation;
mod no_value_in_markup;
mod prefer_peek_in_effect;

pub use handle_naming::HandleNaming;
pub use no_handle_alias::NoHandleAlias;
pub use no_peek_in_markup::NoPeekInMarkup;
pub use no_render_creation::NoRenderCreation;
pub use no_render_mutation::NoRenderMutation;
pub use no_value_in_markup::NoValueInMarkup;
pub use prefer_peek_in_effect::PreferPeekInEffect;
