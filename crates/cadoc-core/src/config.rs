//! Run configuration: distribution tables, totals and fee constants.
//!
//! Everything the allocators need is carried by [`CadocConfig`] and passed in
//! explicitly. `Default` reproduces the shipped figures; a TOML file can
//! override any subset of them.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::distribution::DistributionTable;
use crate::error::{CoreError, Result};

/// Reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Period {
    pub year: i32,
    pub quarter: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CadocConfig {
    pub years: Vec<i32>,
    pub quarters: Vec<i32>,
    /// Average ticket used to derive transaction counts from values.
    pub average_ticket: f64,
    pub dimensions: DimensionTables,
    pub ranking: RankingConfig,
    pub conccred: ConcCredConfig,
    pub discount: DiscountConfig,
    pub infresta: InfraEstablishmentConfig,
    pub infrterm: InfraTerminalConfig,
    pub intercam: IntercambioConfig,
    pub segments: Vec<SegmentEntry>,
    pub profit: ProfitConfig,
}

/// Shared categorical distributions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DimensionTables {
    pub function: DistributionTable,
    pub brand: DistributionTable,
    pub capture: DistributionTable,
    /// Installments for credit; adjustments are fee surcharges.
    pub credit_installments: DistributionTable,
    /// Installments for debit; adjustments are fee surcharges.
    pub debit_installments: DistributionTable,
    pub segment: DistributionTable,
    pub uf: DistributionTable,
    pub card_type: DistributionTable,
    pub product: DistributionTable,
}

/// Band of synthetic ranking clients.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RankingBand {
    pub clients: i64,
    pub base_code: i64,
    pub code_step: i64,
    pub base_value: f64,
    pub value_step: f64,
    pub fees: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RankingConfig {
    pub largest: RankingBand,
    pub smallest: RankingBand,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ConcCredConfig {
    pub total_value: f64,
    pub total_establishments: i64,
    pub active_establishments: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DiscountConfig {
    pub total_value: f64,
    pub average_fee: f64,
    /// Offset added to the fee to obtain the minimum fee.
    pub min_fee_offset: f64,
    /// Offset added to the fee to obtain the maximum fee.
    pub max_fee_offset: f64,
    /// Standard deviation as a fraction of the fee.
    pub stddev_proportion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct InfraEstablishmentConfig {
    pub total_establishments: i64,
    /// Manual, electronic and remote capture, in that order.
    pub capture_split: DistributionTable,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct InfraTerminalConfig {
    pub total_terminals: i64,
    /// Shared POS, chip-reader POS and PDV, in that order.
    pub terminal_split: DistributionTable,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IntercambioConfig {
    pub total_value: f64,
    pub average_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentEntry {
    pub code: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProfitConfig {
    pub revenue_total: f64,
    /// Discount, equipment rent and other revenue, in that order.
    pub revenue_split: DistributionTable,
    pub cost_total: f64,
    /// Interchange, marketing, brand access, risk, processing and other cost.
    pub cost_split: DistributionTable,
}

impl CadocConfig {
    /// Every configured (year, quarter), years outermost.
    pub fn periods(&self) -> Vec<Period> {
        self.years
            .iter()
            .flat_map(|year| {
                self.quarters.iter().map(move |quarter| Period {
                    year: *year,
                    quarter: *quarter,
                })
            })
            .collect()
    }

    /// Reject configurations the allocators cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.periods().is_empty() {
            return Err(CoreError::InvalidConfig(
                "at least one year and one quarter are required".to_string(),
            ));
        }
        if let Some(quarter) = self.quarters.iter().find(|q| !(1..=4).contains(*q)) {
            return Err(CoreError::InvalidConfig(format!(
                "quarter {quarter} is outside 1..=4"
            )));
        }
        if !(self.average_ticket > 0.0) {
            return Err(CoreError::InvalidConfig(
                "average_ticket must be positive".to_string(),
            ));
        }
        for (name, table) in self.named_tables() {
            if table.is_empty() {
                return Err(CoreError::InvalidConfig(format!(
                    "distribution table '{name}' is empty"
                )));
            }
            if table.entries().iter().any(|entry| entry.proportion < 0.0) {
                return Err(CoreError::InvalidConfig(format!(
                    "distribution table '{name}' has a negative proportion"
                )));
            }
        }
        for (name, table, expected) in [
            ("infresta.capture_split", &self.infresta.capture_split, 3),
            ("infrterm.terminal_split", &self.infrterm.terminal_split, 3),
            ("profit.revenue_split", &self.profit.revenue_split, 3),
            ("profit.cost_split", &self.profit.cost_split, 6),
        ] {
            if table.len() != expected {
                return Err(CoreError::InvalidConfig(format!(
                    "'{name}' must have {expected} entries, found {}",
                    table.len()
                )));
            }
        }
        for (name, band) in [
            ("ranking.largest", &self.ranking.largest),
            ("ranking.smallest", &self.ranking.smallest),
        ] {
            if band.fees.is_empty() {
                return Err(CoreError::InvalidConfig(format!("'{name}' has no fees")));
            }
        }
        Ok(())
    }

    /// Tables with their configuration path, for validation and diagnostics.
    pub fn named_tables(&self) -> Vec<(&'static str, &DistributionTable)> {
        let d = &self.dimensions;
        vec![
            ("dimensions.function", &d.function),
            ("dimensions.brand", &d.brand),
            ("dimensions.capture", &d.capture),
            ("dimensions.credit_installments", &d.credit_installments),
            ("dimensions.debit_installments", &d.debit_installments),
            ("dimensions.segment", &d.segment),
            ("dimensions.uf", &d.uf),
            ("dimensions.card_type", &d.card_type),
            ("dimensions.product", &d.product),
            ("infresta.capture_split", &self.infresta.capture_split),
            ("infrterm.terminal_split", &self.infrterm.terminal_split),
            ("profit.revenue_split", &self.profit.revenue_split),
            ("profit.cost_split", &self.profit.cost_split),
        ]
    }
}

/// Load a TOML configuration; missing keys fall back to the defaults.
pub fn load_config(path: &Path) -> Result<CadocConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: CadocConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Default for CadocConfig {
    fn default() -> Self {
        Self {
            years: vec![2025],
            quarters: vec![3],
            average_ticket: 150.0,
            dimensions: DimensionTables::default(),
            ranking: RankingConfig::default(),
            conccred: ConcCredConfig::default(),
            discount: DiscountConfig::default(),
            infresta: InfraEstablishmentConfig::default(),
            infrterm: InfraTerminalConfig::default(),
            intercam: IntercambioConfig::default(),
            segments: default_segments(),
            profit: ProfitConfig::default(),
        }
    }
}

impl Default for DimensionTables {
    fn default() -> Self {
        Self {
            function: DistributionTable::texts(&[("D", 0.7), ("C", 0.3)]),
            brand: DistributionTable::ints(&[(1, 0.5), (2, 0.3), (8, 0.2)]),
            capture: DistributionTable::ints(&[(2, 0.7), (5, 0.3)]),
            credit_installments: DistributionTable::ints_adjusted(&[
                (1, 0.22, 0.00),
                (2, 0.14, 1.10),
                (3, 0.13, 1.10),
                (4, 0.10, 1.10),
                (5, 0.08, 1.10),
                (6, 0.07, 1.10),
                (7, 0.05, 2.15),
                (8, 0.05, 2.15),
                (9, 0.04, 2.15),
                (10, 0.04, 2.15),
                (11, 0.04, 2.15),
                (12, 0.04, 2.15),
            ]),
            debit_installments: DistributionTable::ints_adjusted(&[(1, 1.0, -0.5)]),
            segment: DistributionTable::ints(&[
                (401, 0.05),
                (402, 0.05),
                (403, 0.05),
                (404, 0.05),
                (405, 0.05),
                (406, 0.05),
                (407, 0.05),
                (408, 0.05),
                (409, 0.05),
                (410, 0.05),
                (411, 0.05),
                (412, 0.05),
                (413, 0.05),
                (414, 0.05),
                (415, 0.05),
                (416, 0.05),
                (421, 0.02),
                (422, 0.02),
                (423, 0.02),
                (424, 0.02),
                (425, 0.02),
                (426, 0.02),
                (427, 0.04),
                (428, 0.04),
            ]),
            uf: DistributionTable::texts(&[
                ("SP", 0.2159),
                ("MG", 0.1002),
                ("RJ", 0.0807),
                ("BA", 0.0697),
                ("PR", 0.0557),
                ("RS", 0.0526),
                ("PE", 0.0448),
                ("CE", 0.0434),
                ("PA", 0.0408),
                ("SC", 0.0384),
                ("GO", 0.0348),
                ("MA", 0.0329),
                ("AM", 0.0202),
                ("PB", 0.0195),
                ("ES", 0.0193),
                ("MT", 0.0182),
                ("RN", 0.0162),
                ("PI", 0.0158),
                ("AL", 0.0151),
                ("DF", 0.0140),
                ("MS", 0.0137),
                ("SE", 0.0108),
                ("RO", 0.0082),
                ("TO", 0.0074),
                ("AC", 0.0041),
                ("AP", 0.0039),
                ("RR", 0.0030),
            ]),
            card_type: DistributionTable::texts(&[("P", 0.8), ("H", 0.1), ("C", 0.1)]),
            product: DistributionTable::ints(&[
                (32, 0.5),
                (33, 0.3),
                (34, 0.1),
                (35, 0.05),
                (36, 0.025),
                (37, 0.0025),
            ]),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            largest: RankingBand {
                clients: 15,
                base_code: 12_345_678,
                code_step: 200,
                base_value: 10_500_000.00,
                value_step: 865_000.00,
                fees: vec![0.5, 0.8, 0.7, 1.0, 1.2, 1.5],
            },
            smallest: RankingBand {
                clients: 200,
                base_code: 23_456_789,
                code_step: 200,
                base_value: 80_000.00,
                value_step: 1_680.00,
                fees: vec![1.5, 1.8, 1.9, 2.5, 1.4],
            },
        }
    }
}

impl Default for ConcCredConfig {
    fn default() -> Self {
        Self {
            total_value: 750_234_567.21,
            total_establishments: 7_211_563,
            active_establishments: 5_001_564,
        }
    }
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            total_value: 750_234_567.21,
            average_fee: 2.3,
            min_fee_offset: -1.75,
            max_fee_offset: 2.25,
            stddev_proportion: 0.1,
        }
    }
}

impl Default for InfraEstablishmentConfig {
    fn default() -> Self {
        Self {
            total_establishments: 7_211_563,
            capture_split: DistributionTable::texts(&[
                ("manual", 0.5),
                ("electronic", 0.3),
                ("remote", 0.2),
            ]),
        }
    }
}

impl Default for InfraTerminalConfig {
    fn default() -> Self {
        Self {
            total_terminals: 7_316_222,
            terminal_split: DistributionTable::texts(&[
                ("shared", 0.3),
                ("chip_reader", 0.5),
                ("pdv", 0.2),
            ]),
        }
    }
}

impl Default for IntercambioConfig {
    fn default() -> Self {
        Self {
            total_value: 750_234_567.21,
            average_fee: 1.8,
        }
    }
}

impl Default for ProfitConfig {
    fn default() -> Self {
        Self {
            revenue_total: 17_255_395.05,
            revenue_split: DistributionTable::texts(&[
                ("discount", 0.82),
                ("rent", 0.12),
                ("other", 0.06),
            ]),
            cost_total: 12_003_753.08,
            cost_split: DistributionTable::texts(&[
                ("interchange", 0.55),
                ("marketing", 0.05),
                ("brand_access", 0.08),
                ("risk", 0.02),
                ("processing", 0.20),
                ("other", 0.10),
            ]),
        }
    }
}

fn segment(code: i32, name: &str, description: &str) -> SegmentEntry {
    SegmentEntry {
        code,
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn default_segments() -> Vec<SegmentEntry> {
    vec![
        segment(401, "Cuidados pessoais", "Loja de cosméticos;Navalha elétrica - venda e serviços"),
        segment(402, "Bares e Restaurantes", "Bares, pubs e casas noturnas;Bares de sinuca"),
        segment(403, "Companhias aéreas e afins", "Aeroportos e serviços ligados a aeronaves"),
        segment(
            404,
            "Cultura e Esportes",
            "Cinemas, produções cinematográficas;Academias / clubes",
        ),
        segment(
            405,
            "Educação",
            "Universidades e faculdades;Escola de negócios/vocações;Colégios",
        ),
        segment(
            406,
            "Eletrônicos e eletrodomésticos",
            "Computadores, equipamentos e softwares;Produtos digitais - aplicativos de software (exceto jogos);Lojas de eletrodomésticos",
        ),
        segment(
            407,
            "Farmácias e Cuidados com a saúde",
            "Aparelhos auditivos - vendas e serviços;Farmácias",
        ),
        segment(408, "Grandes Atacadistas", "Atacados de bebidas alcoólicas"),
        segment(
            409,
            "Outros Serviços e Profissionais Liberais",
            "Corretores de imóveis;Serviço funerário;Consultoria empresarial e serviços de relações públicas;Outros serviços profissionais de especializados",
        ),
        segment(
            410,
            "Jogos e Loteria",
            "Corrida de cavalos licenciado;Cassinos, loterias e jogos de azar",
        ),
        segment(
            411,
            "Livrarias e afins",
            "Banca de jornal e provedor de notícias;Artigos de papelaria e suprimentos para escritório",
        ),
        segment(412, "Alimentação", "Loja de doces"),
        segment(
            413,
            "Móveis e construção",
            "Demais serviços de reforma e construção;Piscinas e banheiras - serviços, suprimentos e vendas",
        ),
        segment(
            414,
            "Pequenos supermercados e afins",
            "Lojas especializadas não listadas anteriormente;Lojas de variedades",
        ),
        segment(
            415,
            "Combustíveis e afins",
            "Postos de gasolina;Revendedores de combustíveis",
        ),
        segment(
            416,
            "Roupas, sapatos, acessórios e afins",
            "Conserto de relógios e joias;Aluguel de roupas - fantasias, uniformes e roupas sociais",
        ),
        segment(
            421,
            "Comércio e serviços em geral",
            "Opticians, optical goods, and eyeglasses;Loja de moedas e selos",
        ),
        segment(
            422,
            "Serviços Financeiros",
            "Instituição financeira - agências e serviços;Corretores de residências móveis",
        ),
        segment(
            423,
            "Outros",
            "Armazenamento agrícola, refrigeração, bens domésticos;Telegrafo",
        ),
        segment(
            424,
            "Instituições Financeiras",
            "Bancos / lojas de poupança e inst. Financeira;Instituição financeira - caixa eletrônico",
        ),
        segment(425, "Serviços Públicos", "Multas (fines);Serviços governamentais"),
        segment(426, "Seguros", "Marketing direto de seguros"),
        segment(
            427,
            "Utilities (inclui telecom)",
            "Telefones e equipamentos de telecom.;Catálogo de varejo",
        ),
        segment(428, "Subadquirentes", "Catálogo de varejo"),
    ]
}
