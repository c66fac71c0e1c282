//! Resource metadata: one entry per CRM entity exposed under `/api/<segment>`.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// How a form field is coerced before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    /// Array of `{id}` references to records of `target`. Choices are
    /// shown by their `label` field.
    Relation { target: Resource, label: &'static str },
}

impl FieldKind {
    /// Value a fresh add-form starts with.
    pub fn default_value(self) -> Value {
        match self {
            FieldKind::Text => Value::String(String::new()),
            FieldKind::Integer | FieldKind::Float => Value::from(0),
            FieldKind::Relation { .. } => Value::Array(Vec::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Relation { .. } => "relation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Text }
}

const fn int(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Integer }
}

const fn float(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Float }
}

const fn rel(name: &'static str, target: Resource, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Relation { target, label },
    }
}

const CUSTOMER: &[FieldSpec] = &[
    text("name"),
    text("type"),
    text("industry"),
    text("logo"),
    text("notes"),
    rel("address", Resource::Address, "city"),
    rel("contact", Resource::Contact, "firstName"),
];

const ADDRESS: &[FieldSpec] = &[
    text("street"),
    text("city"),
    text("state"),
    int("zipCode"),
    text("country"),
    text("photo"),
    text("notes"),
];

const PRODUCT_CATEGORY: &[FieldSpec] = &[
    text("name"),
    text("description"),
    text("icon"),
    text("notes"),
];

const SERVICE_CATEGORY: &[FieldSpec] = &[
    text("name"),
    text("description"),
    text("icon"),
    text("taxRate"),
    text("notes"),
];

const CONTACT: &[FieldSpec] = &[
    text("firstName"),
    text("lastName"),
    text("email"),
    text("phone"),
    text("jobTitle"),
    text("photo"),
    text("notes"),
];

const OPPORTUNITY: &[FieldSpec] = &[
    text("estimatedCloseDate"),
    text("stage"),
    text("icon"),
    text("notes"),
];

const LEAD: &[FieldSpec] = &[
    text("source"),
    text("status"),
    float("potentialValue"),
    text("photo"),
    text("notes"),
    rel("address", Resource::Address, "city"),
    rel("opportunity", Resource::Opportunity, "stage"),
    rel("contact", Resource::Contact, "firstName"),
];

const PRODUCT: &[FieldSpec] = &[
    text("name"),
    text("description"),
    float("price"),
    int("stockQuantity"),
    text("photo"),
    text("notes"),
    rel("productCategory", Resource::ProductCategory, "name"),
];

const SERVICE: &[FieldSpec] = &[
    text("name"),
    text("description"),
    text("recurring"),
    text("icon"),
    text("notes"),
    rel("serviceCategory", Resource::ServiceCategory, "name"),
];

const SALE: &[FieldSpec] = &[
    text("productId"),
    text("serviceId"),
    int("customerId"),
    int("quantity"),
    float("totalAmount"),
    text("saleDate"),
    text("receiptPhoto"),
    text("notes"),
];

const VENDOR: &[FieldSpec] = &[
    text("name"),
    text("email"),
    text("phone"),
    text("website"),
    text("photo"),
    text("notes"),
];

const SUPPORT_CASE: &[FieldSpec] = &[
    int("customerId"),
    int("productId"),
    text("serviceId"),
    text("status"),
    text("description"),
    text("createdDateTime"),
    text("modifiedDateTime"),
    int("userId"),
    text("followupDate"),
    text("icon"),
    text("notes"),
];

const TODO_TASK: &[FieldSpec] = &[
    text("name"),
    text("description"),
    int("assignedTo"),
    text("status"),
    text("dueDate"),
    text("createdDateTime"),
    text("modifiedDateTime"),
    int("userId"),
    text("followupDate"),
    text("icon"),
    text("notes"),
];

const REWARD: &[FieldSpec] = &[
    text("name"),
    text("description"),
    int("points"),
    int("customerId"),
    text("icon"),
    text("notes"),
];

/// A CRM entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Customer,
    Address,
    ProductCategory,
    ServiceCategory,
    Contact,
    Opportunity,
    Lead,
    Product,
    Service,
    Sale,
    Vendor,
    SupportCase,
    TodoTask,
    Reward,
}

impl Resource {
    pub const ALL: [Resource; 14] = [
        Resource::Customer,
        Resource::Address,
        Resource::ProductCategory,
        Resource::ServiceCategory,
        Resource::Contact,
        Resource::Opportunity,
        Resource::Lead,
        Resource::Product,
        Resource::Service,
        Resource::Sale,
        Resource::Vendor,
        Resource::SupportCase,
        Resource::TodoTask,
        Resource::Reward,
    ];

    /// Path segment under `/api/`.
    pub fn segment(self) -> &'static str {
        match self {
            Resource::Customer => "customer",
            Resource::Address => "address",
            Resource::ProductCategory => "productcategory",
            Resource::ServiceCategory => "servicecategory",
            Resource::Contact => "contact",
            Resource::Opportunity => "opportunity",
            Resource::Lead => "lead",
            Resource::Product => "product",
            Resource::Service => "service",
            Resource::Sale => "sale",
            Resource::Vendor => "vendor",
            Resource::SupportCase => "supportcase",
            Resource::TodoTask => "todotask",
            Resource::Reward => "reward",
        }
    }

    /// Lower-case singular label used in messages.
    pub fn singular(self) -> &'static str {
        match self {
            Resource::Customer => "customer",
            Resource::Address => "address",
            Resource::ProductCategory => "product category",
            Resource::ServiceCategory => "service category",
            Resource::Contact => "contact",
            Resource::Opportunity => "opportunity",
            Resource::Lead => "lead",
            Resource::Product => "product",
            Resource::Service => "service",
            Resource::Sale => "sale",
            Resource::Vendor => "vendor",
            Resource::SupportCase => "support case",
            Resource::TodoTask => "todo task",
            Resource::Reward => "reward",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Resource::Customer => "customers",
            Resource::Address => "addresses",
            Resource::ProductCategory => "product categories",
            Resource::ServiceCategory => "service categories",
            Resource::Contact => "contacts",
            Resource::Opportunity => "opportunities",
            Resource::Lead => "leads",
            Resource::Product => "products",
            Resource::Service => "services",
            Resource::Sale => "sales",
            Resource::Vendor => "vendors",
            Resource::SupportCase => "support cases",
            Resource::TodoTask => "todo tasks",
            Resource::Reward => "rewards",
        }
    }

    /// Singular label with the first letter upper-cased, for sentence starts.
    pub fn title(self) -> String {
        let singular = self.singular();
        let mut chars = singular.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Editable fields in form order. `id` is never listed.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Resource::Customer => CUSTOMER,
            Resource::Address => ADDRESS,
            Resource::ProductCategory => PRODUCT_CATEGORY,
            Resource::ServiceCategory => SERVICE_CATEGORY,
            Resource::Contact => CONTACT,
            Resource::Opportunity => OPPORTUNITY,
            Resource::Lead => LEAD,
            Resource::Product => PRODUCT,
            Resource::Service => SERVICE,
            Resource::Sale => SALE,
            Resource::Vendor => VENDOR,
            Resource::SupportCase => SUPPORT_CASE,
            Resource::TodoTask => TODO_TASK,
            Resource::Reward => REWARD,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }

    pub fn relation_fields(self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields()
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Relation { .. }))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource '{0}'")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        Resource::ALL
            .into_iter()
            .find(|r| r.segment() == wanted)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}
