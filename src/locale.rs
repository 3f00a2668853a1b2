//! User-facing text in English and Arabic.
//!
//! Everything the analyzer or the report emits as prose is produced here so
//! the analytic modules stay language-agnostic.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{KpiKind, WarningKind},
    format::{format_count, format_currency, format_percent, format_quantity},
    mapping::SemanticField,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Language {
    #[default]
    #[serde(rename = "en", alias = "english")]
    #[value(name = "en", alias = "english")]
    English,
    #[serde(rename = "ar", alias = "arabic")]
    #[value(name = "ar", alias = "arabic")]
    Arabic,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fixed report and summary wording for one language.
#[derive(Debug)]
pub struct Texts {
    pub report_title: &'static str,
    pub report_date: &'static str,
    pub analysis_period: &'static str,
    pub target_audience: &'static str,
    pub audience: &'static str,
    pub executive_summary: &'static str,
    pub summary_intro: &'static str,
    pub total_sales: &'static str,
    pub total_transactions: &'static str,
    pub gross_margin: &'static str,
    pub key_findings: &'static str,
    pub no_findings: &'static str,
    pub margin_analysis: &'static str,
    pub recommendations: &'static str,
    pub recommendation_block: &'static [&'static str],
    pub data_quality: &'static str,
    pub issues_detected: &'static str,
    pub quality_ok: &'static str,
    pub end_of_report: &'static str,
    pub not_available: &'static str,
    pub period_separator: &'static str,
    pub estimated_suffix: &'static str,
    pub field_header: &'static str,
    pub column_header: &'static str,
}

const ENGLISH: Texts = Texts {
    report_title: "SALES ANALYSIS REPORT",
    report_date: "Report Date",
    analysis_period: "Analysis Period",
    target_audience: "Target Audience",
    audience: "This product is designed for small and medium businesses to quickly understand sales performance",
    executive_summary: "EXECUTIVE SUMMARY",
    summary_intro: "Comprehensive sales data analysis conducted to extract actionable insights.",
    total_sales: "Total Sales",
    total_transactions: "Total Transactions",
    gross_margin: "Gross Margin",
    key_findings: "KEY FINDINGS",
    no_findings: "No findings could be derived from the mapped columns.",
    margin_analysis: "GROSS MARGIN ANALYSIS",
    recommendations: "STRATEGIC RECOMMENDATIONS",
    recommendation_block: &[
        "1. Improve Profit Margin",
        "   • Review cost of goods",
        "   • Adjust pricing strategy",
        "   • Reduce unnecessary discounts",
        "",
        "2. Enhance High-Performing Regions",
        "   • Focus marketing on profitable regions",
        "   • Increase stock availability",
        "",
        "3. Invest in Top Products",
        "   • Increase production of best-selling products",
        "   • Develop similar products",
    ],
    data_quality: "DATA QUALITY",
    issues_detected: "⚠️ Some issues detected:",
    quality_ok: "✅ Excellent data quality - No major issues found",
    end_of_report: "END OF REPORT",
    not_available: "N/A",
    period_separator: "to",
    estimated_suffix: "(estimated)",
    field_header: "Field",
    column_header: "Column",
};

const ARABIC: Texts = Texts {
    report_title: "تقرير تحليل المبيعات",
    report_date: "تاريخ التقرير",
    analysis_period: "فترة التحليل",
    target_audience: "الجمهور المستهدف",
    audience: "هذا المنتج مصمم للشركات الصغيرة والمتوسطة لفهم أداء المبيعات بسرعة",
    executive_summary: "الملخص التنفيذي",
    summary_intro: "تم إجراء تحليل شامل لبيانات المبيعات لاستخلاص رؤى قابلة للتنفيذ.",
    total_sales: "إجمالي المبيعات",
    total_transactions: "عدد المعاملات",
    gross_margin: "هامش الربح الإجمالي",
    key_findings: "النقاط الرئيسية",
    no_findings: "لا توجد نقاط يمكن استخلاصها من الأعمدة المحددة.",
    margin_analysis: "تحليل هامش الربح",
    recommendations: "التوصيات الاستراتيجية",
    recommendation_block: &[
        "1. تحسين هامش الربح",
        "   • راجع تكاليف البضاعة",
        "   • عدل استراتيجية التسعير",
        "   • قلل الخصومات غير الضرورية",
        "",
        "2. تعزيز المناطق عالية الأداء",
        "   • ركز التسويق على المناطق الرابحة",
        "   • زود المخزون فيها",
        "",
        "3. استثمار أفضل المنتجات",
        "   • زد إنتاجية المنتجات الأكثر مبيعاً",
        "   • طور منتجات مشابهة لها",
    ],
    data_quality: "جودة البيانات",
    issues_detected: "⚠️ تم اكتشاف بعض المشاكل:",
    quality_ok: "✅ جودة البيانات ممتازة - لا توجد مشاكل رئيسية",
    end_of_report: "نهاية التقرير",
    not_available: "غير متوفر",
    period_separator: "إلى",
    estimated_suffix: "(تقديري)",
    field_header: "الحقل",
    column_header: "العمود",
};

/// Qualitative bucket for a gross margin percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginBand {
    Excellent,
    Average,
    Low,
}

impl MarginBand {
    pub fn of(margin: f64) -> Self {
        if margin > 20.0 {
            MarginBand::Excellent
        } else if margin > 10.0 {
            MarginBand::Average
        } else {
            MarginBand::Low
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            MarginBand::Excellent => "✅",
            MarginBand::Average => "⚠️",
            MarginBand::Low => "❌",
        }
    }
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }

    pub fn texts(&self) -> &'static Texts {
        match self {
            Language::English => &ENGLISH,
            Language::Arabic => &ARABIC,
        }
    }

    pub fn kpi_label(&self, kind: KpiKind) -> &'static str {
        use KpiKind::*;
        match (self, kind) {
            (Language::English, TotalTransactions) => "Total Transactions",
            (Language::English, TotalSales) => "Total Sales",
            (Language::English, AvgTransaction) => "Average Transaction Value",
            (Language::English, GrossProfit) => "Gross Profit",
            (Language::English, GrossMargin) => "Gross Margin",
            (Language::English, UniqueCustomers) => "Number of Customers",
            (Language::English, UniqueProducts) => "Number of Products",
            (Language::English, AvgQuantity) => "Average Quantity",
            (Language::English, DiscountRate) => "Discount Rate",
            (Language::Arabic, TotalTransactions) => "إجمالي المعاملات",
            (Language::Arabic, TotalSales) => "إجمالي المبيعات",
            (Language::Arabic, AvgTransaction) => "متوسط قيمة المعاملة",
            (Language::Arabic, GrossProfit) => "الربح الإجمالي",
            (Language::Arabic, GrossMargin) => "هامش الربح الإجمالي",
            (Language::Arabic, UniqueCustomers) => "عدد العملاء",
            (Language::Arabic, UniqueProducts) => "عدد المنتجات",
            (Language::Arabic, AvgQuantity) => "متوسط الكمية",
            (Language::Arabic, DiscountRate) => "معدل الخصم",
        }
    }

    pub fn kpi_definition(&self, kind: KpiKind) -> Option<&'static str> {
        use KpiKind::*;
        let text = match (self, kind) {
            (Language::English, TotalTransactions) => "Number of completed invoices or transactions",
            (Language::English, TotalSales) => "Total revenue from all transactions",
            (Language::English, GrossProfit) => "Revenue remaining after deducting cost of goods sold",
            (Language::English, GrossMargin) => {
                "Percentage of revenue remaining after deducting cost of goods sold"
            }
            (Language::Arabic, TotalTransactions) => "عدد الفواتير أو المعاملات المكتملة",
            (Language::Arabic, TotalSales) => "إجمالي الإيرادات من جميع المعاملات",
            (Language::Arabic, GrossProfit) => {
                "المبلغ المتبقي من الإيرادات بعد خصم تكلفة البضاعة المباعة"
            }
            (Language::Arabic, GrossMargin) => {
                "النسبة المئوية للإيرادات المتبقية بعد خصم تكلفة البضاعة المباعة"
            }
            _ => return None,
        };
        Some(text)
    }

    pub fn field_label(&self, field: SemanticField) -> &'static str {
        use SemanticField::*;
        match (self, field) {
            (Language::English, OrderId) => "Order ID",
            (Language::English, CustomerId) => "Customer ID",
            (Language::English, CustomerName) => "Customer Name",
            (Language::English, ProductId) => "Product ID",
            (Language::English, ProductName) => "Product Name",
            (Language::English, Category) => "Category",
            (Language::English, Quantity) => "Quantity",
            (Language::English, Price) => "Unit Price",
            (Language::English, TotalAmount) => "Total Amount",
            (Language::English, OrderDate) => "Order Date",
            (Language::English, Region) => "Region",
            (Language::English, City) => "City",
            (Language::English, Country) => "Country",
            (Language::English, Salesperson) => "Salesperson",
            (Language::English, PaymentMethod) => "Payment Method",
            (Language::English, Discount) => "Discount",
            (Language::English, Profit) => "Profit",
            (Language::English, Cost) => "Cost",
            (Language::English, Status) => "Order Status",
            (Language::Arabic, OrderId) => "رقم الطلب",
            (Language::Arabic, CustomerId) => "رقم العميل",
            (Language::Arabic, CustomerName) => "اسم العميل",
            (Language::Arabic, ProductId) => "رقم المنتج",
            (Language::Arabic, ProductName) => "اسم المنتج",
            (Language::Arabic, Category) => "الفئة",
            (Language::Arabic, Quantity) => "الكمية",
            (Language::Arabic, Price) => "سعر الوحدة",
            (Language::Arabic, TotalAmount) => "المبلغ الإجمالي",
            (Language::Arabic, OrderDate) => "تاريخ الطلب",
            (Language::Arabic, Region) => "المنطقة",
            (Language::Arabic, City) => "المدينة",
            (Language::Arabic, Country) => "البلد",
            (Language::Arabic, Salesperson) => "مندوب المبيعات",
            (Language::Arabic, PaymentMethod) => "طريقة الدفع",
            (Language::Arabic, Discount) => "الخصم",
            (Language::Arabic, Profit) => "الربح",
            (Language::Arabic, Cost) => "التكلفة",
            (Language::Arabic, Status) => "حالة الطلب",
        }
    }

    pub fn top_region(&self, region: &str, sales: f64) -> String {
        let amount = format_currency(sales);
        match self {
            Language::English => format!("🏆 Top Sales Region: {region} ({amount})"),
            Language::Arabic => format!("🏆 أفضل منطقة مبيعات: {region} ({amount})"),
        }
    }

    pub fn top_product(&self, product: &str, units: f64) -> String {
        let units = format_quantity(units);
        match self {
            Language::English => format!("📦 Top Selling Product: {product} ({units} units)"),
            Language::Arabic => format!("📦 أكثر منتج مبيعاً: {product} ({units} وحدة)"),
        }
    }

    pub fn top_salesperson(&self, name: &str, sales: f64) -> String {
        let amount = format_currency(sales);
        match self {
            Language::English => format!("👤 Top Salesperson: {name} ({amount})"),
            Language::Arabic => format!("👤 أفضل مندوب مبيعات: {name} ({amount})"),
        }
    }

    pub fn profitability_rate(&self, rate: f64) -> String {
        let rate = format_percent(rate);
        match self {
            Language::English => format!("💹 Profitable Transactions: {rate} of orders"),
            Language::Arabic => format!("💹 المعاملات الرابحة: {rate} من الطلبات"),
        }
    }

    pub fn repeat_customers(&self, rate: f64) -> String {
        let rate = format_percent(rate);
        match self {
            Language::English => format!("🔁 Repeat Customer Rate: {rate}"),
            Language::Arabic => format!("🔁 معدل تكرار العملاء: {rate}"),
        }
    }

    /// One-line margin insight, e.g. `✅ Excellent Profit Margin: 25.0% (Above average)`.
    pub fn margin_insight(&self, margin: f64) -> String {
        let band = MarginBand::of(margin);
        let value = format_percent(margin);
        let (title, note) = match (self, band) {
            (Language::English, MarginBand::Excellent) => ("Excellent Profit Margin", "Above average"),
            (Language::English, MarginBand::Average) => ("Average Profit Margin", "Needs improvement"),
            (Language::English, MarginBand::Low) => ("Low Profit Margin", "Review needed"),
            (Language::Arabic, MarginBand::Excellent) => ("هامش ربح ممتاز", "أعلى من المتوسط"),
            (Language::Arabic, MarginBand::Average) => ("هامش ربح متوسط", "بحاجة للتحسين"),
            (Language::Arabic, MarginBand::Low) => ("هامش ربح منخفض", "تحتاج مراجعة"),
        };
        format!("{} {title}: {value} ({note})", band.icon())
    }

    /// Two-line margin commentary used by the report body.
    pub fn margin_commentary(&self, margin: f64) -> [String; 2] {
        let band = MarginBand::of(margin);
        let value = format_percent(margin);
        let (title, note) = match (self, band) {
            (Language::English, MarginBand::Excellent) => (
                "Excellent Profit Margin",
                "Above industry average - Maintain this performance",
            ),
            (Language::English, MarginBand::Average) => {
                ("Average Profit Margin", "Needs improvement - Review cost of goods")
            }
            (Language::English, MarginBand::Low) => (
                "Low Profit Margin",
                "Requires urgent review - Check pricing and costs",
            ),
            (Language::Arabic, MarginBand::Excellent) => (
                "هامش الربح ممتاز",
                "أعلى من متوسط الصناعة - حافظ على هذا الأداء",
            ),
            (Language::Arabic, MarginBand::Average) => {
                ("هامش الربح متوسط", "بحاجة للتحسين - راجع تكاليف البضاعة")
            }
            (Language::Arabic, MarginBand::Low) => (
                "هامش الربح منخفض",
                "يتطلب مراجعة عاجلة - راجع التسعير والتكاليف",
            ),
        };
        [
            format!("{} {title} ({value})", band.icon()),
            format!("   ({note})"),
        ]
    }

    pub fn warning(&self, kind: WarningKind, count: usize, columns: &[String]) -> String {
        let n = format_count(count);
        match (self, kind) {
            (Language::English, WarningKind::HighMissing) => {
                format!("⚠️ Columns with missing values >20%: {}", columns.join(", "))
            }
            (Language::English, WarningKind::DuplicateRows) => format!("⚠️ Found {n} duplicate records"),
            (Language::English, WarningKind::NegativeAmounts) => {
                format!("⚠️ Found {n} transactions with negative amounts")
            }
            (Language::English, WarningKind::InvalidQuantities) => {
                format!("⚠️ Found {n} transactions with invalid quantities (<= 0 or > 1000)")
            }
            (Language::English, WarningKind::FutureDates) => {
                format!("⚠️ Found {n} orders dated in the future")
            }
            (Language::Arabic, WarningKind::HighMissing) => {
                format!("⚠️ أعمدة بها قيم مفقودة >20%: {}", columns.join("، "))
            }
            (Language::Arabic, WarningKind::DuplicateRows) => format!("⚠️ يوجد {n} سجل مكرر"),
            (Language::Arabic, WarningKind::NegativeAmounts) => {
                format!("⚠️ يوجد {n} معاملة بمبلغ سالب")
            }
            (Language::Arabic, WarningKind::InvalidQuantities) => {
                format!("⚠️ يوجد {n} معاملة بكمية غير صالحة (<= 0 أو > 1000)")
            }
            (Language::Arabic, WarningKind::FutureDates) => {
                format!("⚠️ يوجد {n} طلب بتاريخ مستقبلي")
            }
        }
    }
}
