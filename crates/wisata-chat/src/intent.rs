//! Intent classification as an ordered list of predicate -> intent rules.
//!
//! Signals are computed once per utterance; the first rule whose predicate
//! holds decides the intent. The order is fixed: bundle, promo, transport,
//! then the general fallback that always matches.

use serde::Serialize;
use wisata_core::config::KeywordConfig;
use wisata_core::text::contains_any;

use crate::resolver::{resolve_city, ResolvedCity};
use crate::types::Intent;

/// Keyword memberships and the promo city of one utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingSignals {
    pub recommendation: bool,
    pub lodging: bool,
    pub bundle_transport: bool,
    pub promo: bool,
    pub transport: bool,
    /// City from a promo-dataset scan of the utterance, else `last_city`.
    pub promo_city: Option<ResolvedCity>,
}

impl RoutingSignals {
    /// The recommendation + lodging + transport keyword triple.
    pub fn bundle_triple(&self) -> bool {
        self.recommendation && self.lodging && self.bundle_transport
    }
}

/// One routing rule: when `matches` holds, the utterance has `intent`.
#[derive(Clone, Copy)]
pub struct IntentRule {
    pub intent: Intent,
    pub matches: fn(&RoutingSignals) -> bool,
}

impl std::fmt::Debug for IntentRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentRule")
            .field("intent", &self.intent)
            .finish()
    }
}

/// Rules in precedence order.
pub static RULES: [IntentRule; 4] = [
    IntentRule {
        intent: Intent::BundleRecommendation,
        matches: RoutingSignals::bundle_triple,
    },
    IntentRule {
        intent: Intent::PromoQuery,
        matches: is_promo,
    },
    IntentRule {
        intent: Intent::TransportQuery,
        matches: is_transport,
    },
    IntentRule {
        intent: Intent::GeneralQuery,
        matches: always,
    },
];

fn is_promo(s: &RoutingSignals) -> bool {
    s.promo && s.promo_city.is_some()
}

fn is_transport(s: &RoutingSignals) -> bool {
    s.transport
}

fn always(_: &RoutingSignals) -> bool {
    true
}

/// Computes routing signals and applies [`RULES`].
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    keywords: KeywordConfig,
}

impl IntentClassifier {
    pub fn new(keywords: KeywordConfig) -> Self {
        Self { keywords }
    }

    pub fn rules(&self) -> &'static [IntentRule] {
        &RULES
    }

    /// Derive the signals of `utterance`. Comparisons ignore case.
    pub fn signals(
        &self,
        utterance: &str,
        promo_cities: &[String],
        last_city: Option<&str>,
    ) -> RoutingSignals {
        let kw = &self.keywords;
        RoutingSignals {
            recommendation: contains_any(utterance, &kw.recommendation),
            lodging: contains_any(utterance, &kw.lodging),
            bundle_transport: contains_any(utterance, &kw.bundle_transport),
            promo: contains_any(utterance, &kw.promo),
            transport: contains_any(utterance, &kw.transport),
            promo_city: resolve_city(utterance, promo_cities, last_city),
        }
    }

    /// First matching rule's intent.
    pub fn classify(&self, signals: &RoutingSignals) -> Intent {
        self.rules()
            .iter()
            .find(|rule| (rule.matches)(signals))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::GeneralQuery)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(KeywordConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promo_cities() -> Vec<String> {
        vec!["Surabaya".to_string(), "Bali".to_string()]
    }

    fn classify(utterance: &str, last_city: Option<&str>) -> Intent {
        let classifier = IntentClassifier::default();
        let signals = classifier.signals(utterance, &promo_cities(), last_city);
        classifier.classify(&signals)
    }

    // ---- rule order ----

    #[test]
    fn test_rule_order() {
        let order: Vec<Intent> = IntentClassifier::default()
            .rules()
            .iter()
            .map(|r| r.intent)
            .collect();
        assert_eq!(
            order,
            vec![
                Intent::BundleRecommendation,
                Intent::PromoQuery,
                Intent::TransportQuery,
                Intent::GeneralQuery
            ]
        );
    }

    #[test]
    fn test_general_rule_always_matches() {
        let general = RULES[3];
        assert!((general.matches)(&RoutingSignals::default()));
    }

    #[test]
    fn test_bundle_beats_promo_and_transport() {
        let signals = RoutingSignals {
            recommendation: true,
            lodging: true,
            bundle_transport: true,
            promo: true,
            transport: true,
            promo_city: Some(ResolvedCity {
                name: "Bali".to_string(),
                source: crate::resolver::CitySource::Utterance,
            }),
        };
        assert_eq!(
            IntentClassifier::default().classify(&signals),
            Intent::BundleRecommendation
        );
    }

    #[test]
    fn test_promo_beats_transport() {
        assert_eq!(
            classify("promo tiket ke Surabaya", None),
            Intent::PromoQuery
        );
    }

    // ---- classification ----

    #[test]
    fn test_bundle_needs_all_three_keywords() {
        assert_eq!(
            classify("rekomendasi hotel dan kendaraan di Bandung", None),
            Intent::BundleRecommendation
        );
        assert_eq!(
            classify("rekomendasi hotel di Bandung", None),
            Intent::GeneralQuery
        );
        assert_eq!(
            classify("Rekomendasi PENGINAPAN dan Transport", Some("Malang")),
            Intent::BundleRecommendation
        );
    }

    #[test]
    fn test_promo_needs_city() {
        assert_eq!(classify("promo ke Surabaya", None), Intent::PromoQuery);
        assert_eq!(classify("ada promo?", None), Intent::GeneralQuery);
        assert_eq!(classify("ada promo?", Some("Bandung")), Intent::PromoQuery);
    }

    #[test]
    fn test_transport_keywords() {
        for utterance in [
            "ada tiket kereta?",
            "berapa harga ke sana",
            "Transportasi apa saja",
            "biaya perjalanan",
            "kendaraan umum",
        ] {
            assert_eq!(classify(utterance, None), Intent::TransportQuery, "{utterance}");
        }
    }

    #[test]
    fn test_general_fallback() {
        assert_eq!(classify("Apa kabar?", None), Intent::GeneralQuery);
    }

    #[test]
    fn test_signals_promo_city_from_utterance() {
        let classifier = IntentClassifier::default();
        let signals = classifier.signals("PROMO bali dong", &promo_cities(), Some("Surabaya"));
        assert!(signals.promo);
        assert_eq!(signals.promo_city.unwrap().name, "Bali");
    }

    #[test]
    fn test_custom_keywords() {
        let mut keywords = KeywordConfig::default();
        keywords.promo.push("diskon".to_string());
        let classifier = IntentClassifier::new(keywords);
        let signals = classifier.signals("diskon Surabaya", &promo_cities(), None);
        assert_eq!(classifier.classify(&signals), Intent::PromoQuery);
    }
}
