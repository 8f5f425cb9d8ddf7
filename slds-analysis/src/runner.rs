//! Pipeline orchestration for one analyzed entry
//!
//! Every matcher runs against the entry, spread over `Context::workers`
//! scoped threads. Each thread merges its own results; the partial results
//! are then combined, ranked by the processor and filtered against the
//! entry's suppression ranges.

use crate::aggregator::{Aggregator, Equivalence};
use crate::catalog::{Catalog, ComponentRegistry, RuleTable, TokenCatalog};
use crate::context::{Context, ContextKey};
use crate::error::{Error, Result};
use crate::matchers::{
    ComponentOverrideMatcher, DesignTokenMatcher, InvalidMatcher, MarkupLabelMatcher, Matcher,
    MobileCssMatcher, MobileFriendlyMatcher, OverrideMatcher, PriorityMatcher,
    TokenCategoryMatcher, UtilityClassMatcher,
};
use crate::model::{ComponentOverride, Recommendation, Report};
use crate::processor;
use slds_parser::{Bundle, Entry, InputKind};
use std::sync::Arc;

pub struct Runner {
    catalog: Arc<dyn TokenCatalog>,
    matchers: Vec<Box<dyn Matcher>>,
    override_matchers: Vec<Box<dyn OverrideMatcher>>,
    aggregator: Aggregator,
}

impl Runner {
    pub fn new(
        catalog: Arc<dyn TokenCatalog>,
        rules: RuleTable,
        registry: ComponentRegistry,
    ) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::CatalogUnavailable);
        }

        let mut matchers: Vec<Box<dyn Matcher>> = vec![
            Box::new(DesignTokenMatcher::new(catalog.clone(), rules.successors())),
            Box::new(UtilityClassMatcher::new(catalog.as_ref())),
            Box::new(PriorityMatcher::new(&rules)),
            Box::new(InvalidMatcher::new(catalog.clone())),
            Box::new(MobileFriendlyMatcher::new(registry)),
            Box::new(MarkupLabelMatcher),
            Box::new(MobileCssMatcher::new(catalog.clone())),
        ];
        for matcher in TokenCategoryMatcher::per_category(catalog.as_ref()) {
            matchers.push(Box::new(matcher));
        }
        let override_matchers: Vec<Box<dyn OverrideMatcher>> =
            vec![Box::new(ComponentOverrideMatcher::new(catalog.clone()))];

        tracing::debug!(matchers = matchers.len(), "runner ready");
        Ok(Self {
            catalog,
            matchers,
            override_matchers,
            aggregator: Aggregator::new(Equivalence::SameInput),
        })
    }

    /// A runner over the bundled catalog, rule table and component registry.
    pub fn bundled() -> Result<Self> {
        Self::new(
            Arc::new(Catalog::bundled()?),
            RuleTable::bundled()?,
            ComponentRegistry::bundled()?,
        )
    }

    pub fn with_matcher(mut self, matcher: Box<dyn Matcher>) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn catalog(&self) -> &Arc<dyn TokenCatalog> {
        &self.catalog
    }

    pub fn matcher_names(&self) -> Vec<&str> {
        self.matchers.iter().map(|matcher| matcher.name()).collect()
    }

    pub fn run(&self, entry: &Entry, bundle: &Bundle, context: &Context) -> Report {
        let mut report = Report {
            path: entry.path.clone(),
            ..Report::default()
        };
        if !context.is_enabled(ContextKey::Global) {
            return report;
        }
        let _span = tracing::info_span!("run", path = %entry.path.display()).entered();

        let recommendations = processor::process(self.recommendations(entry, bundle, context));
        report.recommendations = recommendations
            .into_iter()
            .filter(|recommendation| !Self::is_suppressed(entry, recommendation, context))
            .collect();
        report.overrides = self
            .override_matchers
            .iter()
            .flat_map(|matcher| matcher.overrides(entry, bundle, context))
            .filter(|found| !Self::is_override_suppressed(entry, found, context))
            .collect();

        tracing::debug!(
            recommendations = report.recommendations.len(),
            overrides = report.overrides.len(),
            "entry analyzed"
        );
        report
    }

    /// Reports for every entry of the bundle, in bundle order.
    pub fn run_bundle(&self, bundle: &Bundle, context: &Context) -> Vec<Report> {
        bundle
            .entries()
            .iter()
            .map(|entry| self.run(entry, bundle, context))
            .collect()
    }

    fn recommendations(&self, entry: &Entry, bundle: &Bundle, context: &Context) -> Vec<Recommendation> {
        if self.matchers.is_empty() {
            return Vec::new();
        }
        let chunk = self.matchers.len().div_ceil(context.workers());
        let aggregator = self.aggregator;

        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .matchers
                .chunks(chunk)
                .map(|group| {
                    scope.spawn(move || {
                        aggregator.merge(
                            group
                                .iter()
                                .flat_map(|matcher| matcher.matches(entry, bundle, context)),
                        )
                    })
                })
                .collect();

            handles.into_iter().fold(Vec::new(), |merged, handle| match handle.join() {
                Ok(partial) => aggregator.combine(merged, partial),
                Err(panic) => std::panic::resume_unwind(panic),
            })
        })
    }

    /// Markup is always checked; stylesheets and scripts only with `V2_ANNOTATION`.
    fn applies_suppressions(kind: InputKind, context: &Context) -> bool {
        kind == InputKind::HtmlElement || context.is_enabled(ContextKey::V2Annotation)
    }

    fn is_suppressed(entry: &Entry, recommendation: &Recommendation, context: &Context) -> bool {
        Self::applies_suppressions(recommendation.kind(), context)
            && recommendation
                .actions()
                .any(|action| entry.is_suppressed(&action.range))
    }

    fn is_override_suppressed(entry: &Entry, found: &ComponentOverride, context: &Context) -> bool {
        Self::applies_suppressions(InputKind::RuleSet, context) && entry.is_suppressed(&found.action.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActionType;
    use crate::testing;
    use slds_parser::Range;

    fn run(files: &[(&str, &str)], context: &Context) -> Report {
        let bundle = testing::bundle(files);
        testing::runner().run(&bundle.entries()[0], &bundle, context)
    }

    #[test]
    fn test_spacing_values() {
        let report = run(
            &[("card.css", ".THIS { padding: t(spacingXSmall) 0 t(spacingXSmall) 0;}")],
            &Context::default(),
        );
        assert_eq!(report.recommendations.len(), 1);
        let items: Vec<_> = report.recommendations[0].items.iter().collect();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].value, "0");
        let zeros: Vec<_> = items[0].actions.iter().map(|action| action.range).collect();
        assert_eq!(zeros, vec![Range::on_line(0, 34, 35), Range::on_line(0, 53, 54)]);

        assert_eq!(items[1].value, "t(spacingXSmall)");
        let references: Vec<_> = items[1].actions.iter().map(|action| action.range).collect();
        assert_eq!(references, vec![Range::on_line(0, 17, 33), Range::on_line(0, 36, 52)]);
        assert!(items[1]
            .actions
            .iter()
            .all(|action| action.value.as_deref() == Some("t(varSpacingXSmall)")));
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let files = [(
            "card.css",
            ".THIS .title { color: #C23934; font-size: var(--lwc-fontSizeSmall); padding: 1rem; }",
        )];
        let single = run(&files, &Context::default().with_workers(1));
        let many = run(&files, &Context::default().with_workers(16));
        assert!(!single.recommendations.is_empty());
        assert_eq!(single, many);
    }

    #[test]
    fn test_global_switch() {
        let report = run(
            &[("card.css", ".a {font-size: t(testing);}")],
            &Context::with_disabled(["GLOBAL"]),
        );
        assert!(report.is_empty());
        assert!(report.path.ends_with("card/card.css"));
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let catalog: Arc<dyn TokenCatalog> = Arc::new(Catalog::new(vec![], vec![], vec![]));
        let result = Runner::new(catalog, testing::rules(), testing::registry());
        assert!(matches!(result, Err(Error::CatalogUnavailable)));
    }

    #[test]
    fn test_block_suppression_for_styles() {
        let source = "/* sldsValidatorIgnore */\n.a {font-size: t(testing);}\n.b {font-size: t(testing);}\n/* sldsValidatorAllow */\n.c {font-size: t(testing);}";
        let files = [("card.css", source)];

        let report = run(&files, &Context::default());
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].input.range().start.line, 4);

        let report = run(&files, &Context::with_disabled(["V2_ANNOTATION"]));
        assert_eq!(report.recommendations.len(), 2);
        assert!(report
            .recommendations
            .iter()
            .flat_map(|rec| rec.actions())
            .all(|action| action.action_type == ActionType::Remove));
    }

    #[test]
    fn test_markup_suppression_is_always_on() {
        let source = "<template>\n<!-- sldsValidatorIgnore -->\n<lightning-datatable></lightning-datatable>\n<!-- sldsValidatorAllow -->\n<lightning-tree-grid></lightning-tree-grid>\n</template>";
        let report = run(&[("card.html", source)], &Context::with_disabled(["V2_ANNOTATION"]));
        let tags: Vec<_> = report
            .recommendations
            .iter()
            .map(|rec| rec.input.sort_key())
            .collect();
        assert_eq!(tags, vec!["lightning-tree-grid"]);
    }

    #[test]
    fn test_overrides_are_reported_separately() {
        let report = run(&[("card.css", ".THIS .slds-button { color: red; }")], &Context::default());
        assert_eq!(report.overrides.len(), 1);
        assert_eq!(report.overrides[0].overridden_class, "slds-button");
    }

    #[test]
    fn test_run_bundle() {
        let bundle = testing::bundle(&[
            ("card.css", ".a {font-size: t(testing);}"),
            ("card.html", "<template><div class=\"slds-text-heading_small\"></div></template>"),
        ]);
        let reports = testing::runner().run_bundle(&bundle, &Context::default());
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].recommendations.len(), 1);
    }
}
