//! Derived-field filling: optional pre and post hooks around every
//! package's own callback.

use std::fmt;

use tessera_core::PackageError;
use tessera_data::Container;

use crate::error::UpdateError;
use crate::kernels::bound_block;

/// A driver-supplied callback run before or after the packages.
pub type FillHook = Box<dyn Fn(&Container) -> Result<(), PackageError> + Send + Sync>;

/// Hooks bracketing the packages' derived-field callbacks.
///
/// Owned by the driver, so separate drivers (or tests) never share hooks.
/// [`fill_derived`](Self::fill_derived) runs the pre hook, then each
/// package of the container's block in registration order, then the post
/// hook, stopping at the first failure.
#[derive(Default)]
pub struct FillDerivedRegistry {
    pre: Option<FillHook>,
    post: Option<FillHook>,
}

impl FillDerivedRegistry {
    /// A registry with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both hooks. `None` clears a slot.
    pub fn register(&mut self, pre: Option<FillHook>, post: Option<FillHook>) {
        self.pre = pre;
        self.post = post;
    }

    /// Replace the pre hook.
    pub fn set_pre<F>(&mut self, hook: F)
    where
        F: Fn(&Container) -> Result<(), PackageError> + Send + Sync + 'static,
    {
        self.pre = Some(Box::new(hook));
    }

    /// Replace the post hook.
    pub fn set_post<F>(&mut self, hook: F)
    where
        F: Fn(&Container) -> Result<(), PackageError> + Send + Sync + 'static,
    {
        self.post = Some(Box::new(hook));
    }

    /// Remove both hooks.
    pub fn clear(&mut self) {
        self.pre = None;
        self.post = None;
    }

    /// Whether a pre hook is registered.
    pub fn has_pre(&self) -> bool {
        self.pre.is_some()
    }

    /// Whether a post hook is registered.
    pub fn has_post(&self) -> bool {
        self.post.is_some()
    }

    /// Run pre hook, packages, post hook on `container`.
    pub fn fill_derived(&self, container: &Container) -> Result<(), UpdateError> {
        let block = bound_block(container)?;
        if let Some(pre) = &self.pre {
            pre(container).map_err(|source| UpdateError::Hook { hook: "pre", source })?;
        }
        for package in block.packages().iter() {
            package
                .fill_derived(container)
                .map_err(|source| UpdateError::Package {
                    name: package.name().to_string(),
                    source,
                })?;
        }
        if let Some(post) = &self.post {
            post(container).map_err(|source| UpdateError::Hook {
                hook: "post",
                source,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for FillDerivedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillDerivedRegistry")
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}
