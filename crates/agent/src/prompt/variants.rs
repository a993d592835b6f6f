//! Specialized prompt variants and industry guidance blocks.

use serde::{Deserialize, Serialize};

/// Which instruction block is added to the base prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptVariant {
    #[default]
    Base,
    CustomerSupport,
    Sales,
    Technical,
}

const SUPPORT_KEYWORDS: &[&str] = &["help", "support", "problem"];
const SALES_KEYWORDS: &[&str] = &["price", "plan", "upgrade"];
const TECHNICAL_KEYWORDS: &[&str] = &["code", "api", "technical"];

impl PromptVariant {
    /// Pick a variant from the user's message.
    ///
    /// Checked in order support, sales, technical; the first category with
    /// a keyword in the message wins.
    pub fn select(message: &str) -> Self {
        let lower = message.to_lowercase();
        let hit = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if hit(SUPPORT_KEYWORDS) {
            Self::CustomerSupport
        } else if hit(SALES_KEYWORDS) {
            Self::Sales
        } else if hit(TECHNICAL_KEYWORDS) {
            Self::Technical
        } else {
            Self::Base
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::CustomerSupport => "customer_support",
            Self::Sales => "sales",
            Self::Technical => "technical",
        }
    }

    /// The block appended to the base prompt, if any.
    pub fn instructions(&self) -> Option<&'static str> {
        match self {
            Self::Base => None,
            Self::CustomerSupport => Some(
                "Customer support guidelines:\n\
                 - Acknowledge the issue with empathy\n\
                 - Walk through troubleshooting one step at a time\n\
                 - Offer to create a ticket when the issue cannot be solved here",
            ),
            Self::Sales => Some(
                "Sales guidelines:\n\
                 - Focus on the benefits that match the customer's needs\n\
                 - Explain plan differences clearly and honestly\n\
                 - Offer to help with an upgrade when it fits",
            ),
            Self::Technical => Some(
                "Technical guidelines:\n\
                 - Give precise, step-by-step answers\n\
                 - Include code or API examples when helpful\n\
                 - Point to the relevant documentation",
            ),
        }
    }
}

impl std::fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guidance block for a known industry. Unknown industries have none.
pub fn industry_instructions(industry: &str) -> Option<&'static str> {
    match industry.trim().to_lowercase().as_str() {
        "healthcare" => Some(
            "Industry guidelines (healthcare):\n\
             - Do not provide medical diagnoses\n\
             - Encourage consulting a qualified professional\n\
             - Treat personal health information as confidential",
        ),
        "finance" => Some(
            "Industry guidelines (finance):\n\
             - Do not give personalised investment advice\n\
             - Be precise with numbers, rates and fees\n\
             - Remind people never to share passwords or full card numbers",
        ),
        "education" => Some(
            "Industry guidelines (education):\n\
             - Explain concepts step by step\n\
             - Encourage learning over handing out answers\n\
             - Adapt explanations to the learner's level",
        ),
        "ecommerce" => Some(
            "Industry guidelines (ecommerce):\n\
             - Help with orders, shipping and returns\n\
             - Recommend products that match the customer's needs\n\
             - Be clear about prices and availability",
        ),
        _ => None,
    }
}
