//! Mixin resolution and inlining.

use super::{Chain, Context, Output};
use crate::error::{CompileError, Result};
use crate::types::{BlockId, Value};

impl Context<'_> {
    /// Finds the block named by `path`. The first tag is looked up in the
    /// children of every block on `chain`, innermost first; each further tag
    /// only among the previous match's children.
    pub(crate) fn resolve_path(&self, path: &[String], chain: &Chain) -> Option<BlockId> {
        let (first, rest) = path.split_first()?;
        let sheet = self.sheet;
        let mut found = chain
            .blocks()
            .find_map(|id| sheet.get(id).children.get(first).copied())?;
        for tag in rest {
            found = sheet.get(found).children.get(tag).copied()?;
        }
        Some(found)
    }

    /// Compiles the props of the mixin at `path` into `out`, under the
    /// caller's selectors.
    pub(crate) fn inline_mixin(
        &mut self,
        path: &[String],
        args: &[Value],
        tags: &[String],
        chain: &Chain,
        out: &mut Output,
    ) -> Result<()> {
        let Some(target) = self.resolve_path(path, chain) else {
            return Err(CompileError::UnresolvedMixin(path.join(" > ")));
        };
        log::debug!("inlining mixin {} with {} args", path.join(" > "), args.len());

        let sheet = self.sheet;
        let block = sheet.get(target);

        let bound = match &block.args {
            Some(params) => {
                // arguments see the caller's scope, defaults the mixin's
                let values = args
                    .iter()
                    .map(|arg| self.reduce(arg, chain))
                    .collect::<Result<Vec<_>>>()?;
                self.scope.push();
                for (i, param) in params.iter().enumerate() {
                    if let Some(value) = values.get(i).cloned().or_else(|| param.default.clone()) {
                        self.scope.set(&param.name, value);
                    }
                }
                true
            }
            None => false,
        };

        let inner = chain.enter(target);
        let result = self.compile_props(block, tags, &inner, out);

        if bound {
            self.scope.pop();
        }
        result
    }
}
