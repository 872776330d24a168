//! Portuguese display text for the enums and record timelines.

use chrono::{DateTime, Utc};

use crate::{
    CollectionRequest, CollectionStatus, Purpose, QuantityUnit, UserType, WasteRequest,
    WasteRequestStatus, WasteType,
};

pub trait Label {
    fn label(&self) -> &'static str;
}

impl Label for WasteType {
    fn label(&self) -> &'static str {
        match self {
            WasteType::BiomassAsh => "Cinza de Caldeira (Biomassa)",
            WasteType::RiceHuskAsh => "Cinza de Casca de Arroz",
            WasteType::SugarcaneAsh => "Cinza de Bagaço de Cana",
            WasteType::WoodAsh => "Cinza de Madeira",
            WasteType::MixedAsh => "Mistura de Cinzas",
            WasteType::Other => "Outro",
        }
    }
}

impl Label for QuantityUnit {
    fn label(&self) -> &'static str {
        match self {
            QuantityUnit::Kilogram => "Quilogramas (kg)",
            QuantityUnit::Ton => "Toneladas (ton)",
            QuantityUnit::CubicMeter => "Metros cúbicos (m³)",
        }
    }
}

impl Label for Purpose {
    fn label(&self) -> &'static str {
        match self {
            Purpose::SoilCorrection => "Correção de Solo",
            Purpose::OrganicFertilization => "Adubação Orgânica",
            Purpose::Composting => "Compostagem",
            Purpose::MunicipalNursery => "Viveiro Municipal",
            Purpose::CommunityGardens => "Hortas Comunitárias",
            Purpose::LandRecovery => "Recuperação de Áreas Degradadas",
            Purpose::Other => "Outro",
        }
    }
}

impl Label for CollectionStatus {
    fn label(&self) -> &'static str {
        match self {
            CollectionStatus::Pending => "Pendente",
            CollectionStatus::Scheduled => "Agendada",
            CollectionStatus::Completed => "Concluída",
            CollectionStatus::Canceled => "Cancelada",
        }
    }
}

impl Label for WasteRequestStatus {
    fn label(&self) -> &'static str {
        match self {
            WasteRequestStatus::Pending => "Pendente",
            WasteRequestStatus::Approved => "Aprovada",
            WasteRequestStatus::Delivered => "Entregue",
            WasteRequestStatus::Canceled => "Cancelada",
        }
    }
}

impl Label for UserType {
    fn label(&self) -> &'static str {
        match self {
            UserType::Industry => "Agroindústria",
            UserType::Public => "Órgão Público",
        }
    }
}

/// One milestone of a record detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineStep {
    pub title: &'static str,
    pub reached: bool,
    pub date: Option<DateTime<Utc>>,
    /// Shown instead of the date while it is unknown.
    pub placeholder: &'static str,
}

impl CollectionRequest {
    pub fn timeline(&self) -> [TimelineStep; 3] {
        use CollectionStatus::*;
        let status = self.status;
        [
            TimelineStep {
                title: "Solicitação Enviada",
                reached: status != Canceled,
                date: Some(self.request_date),
                placeholder: "",
            },
            TimelineStep {
                title: "Coleta Agendada",
                reached: matches!(status, Scheduled | Completed),
                date: self.scheduled_date,
                placeholder: "Aguardando agendamento",
            },
            TimelineStep {
                title: "Coleta Realizada",
                reached: status == Completed,
                date: self.completed_date,
                placeholder: "Pendente",
            },
        ]
    }
}

impl WasteRequest {
    pub fn timeline(&self) -> [TimelineStep; 3] {
        use WasteRequestStatus::*;
        let status = self.status;
        [
            TimelineStep {
                title: "Solicitação Enviada",
                reached: status != Canceled,
                date: Some(self.request_date),
                placeholder: "",
            },
            TimelineStep {
                title: "Solicitação Aprovada",
                reached: matches!(status, Approved | Delivered),
                date: self.approved_date,
                placeholder: "Aguardando aprovação",
            },
            TimelineStep {
                title: "Resíduo Entregue",
                reached: status == Delivered,
                date: self.delivery_date,
                placeholder: "Pendente",
            },
        ]
    }
}
