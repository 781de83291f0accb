use super::{PatientSource, SimplifiedPatient};
use crate::error::SourceError;
use async_trait::async_trait;
use dority_types::ResourceId;
use fhir::{
    Address, CodeableConcept, Coding, ContactPoint, HumanName, Identifier, PatientContact,
    PatientResource, Reference,
};

const RELATIONSHIP_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v2-0131";
const IDENTIFIER_TYPE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v2-0203";

/// In-memory [`PatientSource`] holding patients in insertion order.
#[derive(Clone, Debug, Default)]
pub struct FixtureSource {
    patients: Vec<PatientResource>,
}

impl FixtureSource {
    pub fn with_patients(patients: Vec<PatientResource>) -> Self {
        Self { patients }
    }

    /// Add a patient, replacing any existing patient with the same id.
    pub fn insert(&mut self, patient: PatientResource) {
        match self.patients.iter_mut().find(|p| p.id == patient.id) {
            Some(existing) => *existing = patient,
            None => self.patients.push(patient),
        }
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// The eight-patient demo roster served when no FHIR server is configured.
    pub fn demo() -> Self {
        let patients = vec![
            DemoPatient::new("patient-001", "John", "Smith", "1958-03-14", "male")
                .mrn("MRN-100001")
                .phone("555-0101", "home")
                .phone("555-0111", "mobile")
                .email("john.smith@example.com")
                .address(&["12 Oak Street"], "Springfield", "IL", "62701")
                .gp("Dr. Alice Moore")
                .contact(kin("C", "Emergency Contact", "Mary", "Smith", "555-0102"))
                .contact(pharmacy("CVS Pharmacy - Main St"))
                .marital("M")
                .build(),
            DemoPatient::new("patient-002", "Sarah", "Johnson", "1985-07-22", "female")
                .mrn("MRN-100002")
                .phone("555-0201", "mobile")
                .email("sarah.j@example.com")
                .address(&["48 Maple Avenue", "Apt 3B"], "Portland", "OR", "97201")
                .gp("Dr. Ben Ortiz")
                .contact(kin("N", "Next-of-Kin", "Linda", "Johnson", "555-0202"))
                .marital("S")
                .build(),
            DemoPatient::new("patient-003", "Michael", "Chen", "1972-11-05", "male")
                .mrn("MRN-100003")
                .phone("555-0301", "work")
                .address(&["300 Pine Road"], "Seattle", "WA", "98101")
                .contact(pharmacy("Walgreens #4412"))
                .marital("D")
                .build(),
            DemoPatient::new("patient-004", "Emily", "Rodriguez", "1996-02-29", "female")
                .mrn("MRN-100004")
                .phone("555-0401", "mobile")
                .email("emily.r@example.com")
                .gp("Dr. Priya Nair")
                .contact(kin("C", "Parent", "Rosa", "Rodriguez", "555-0402"))
                .build(),
            DemoPatient::new("patient-005", "Robert", "Williams", "1949-09-30", "male")
                .mrn("MRN-100005")
                .phone("555-0501", "home")
                .address(&["7 Elm Court"], "Austin", "TX", "73301")
                .gp("Dr. Alice Moore")
                .contact(kin("C", "Spouse", "Helen", "Williams", "555-0502"))
                .contact(pharmacy("Rite Aid Pharmacy"))
                .marital("W")
                .build(),
            DemoPatient::new("patient-006", "Jennifer", "Brown", "1990-01-01", "female")
                .mrn("MRN-100006")
                .phone("555-0601", "mobile")
                .email("jen.brown@example.com")
                .address(&["91 Cedar Lane"], "Denver", "CO", "80201")
                .build(),
            DemoPatient::new("patient-007", "David", "Miller", "1966-06-18", "male")
                .mrn("MRN-100007")
                .phone("555-0701", "home")
                .gp("Dr. Ben Ortiz")
                .contact(kin("N", "Guardian", "Paul", "Miller", "555-0702"))
                .marital("M")
                .build(),
            DemoPatient::new("patient-008", "Maria", "Garcia", "2001-12-09", "female")
                .mrn("MRN-100008")
                .phone("555-0801", "mobile")
                .address(&["5 Birch Way"], "Miami", "FL", "33101")
                .contact(pharmacy("Publix Pharmacy"))
                .build(),
        ];

        Self::with_patients(patients)
    }
}

#[async_trait]
impl PatientSource for FixtureSource {
    async fn read_patient(&self, id: &ResourceId) -> Result<PatientResource, SourceError> {
        self.patients
            .iter()
            .find(|p| p.id.as_deref() == Some(id.as_str()))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }

    async fn list_patients(&self, limit: usize) -> Result<Vec<SimplifiedPatient>, SourceError> {
        Ok(self
            .patients
            .iter()
            .filter_map(SimplifiedPatient::from_resource)
            .take(limit)
            .collect())
    }
}

struct DemoPatient(PatientResource);

impl DemoPatient {
    fn new(id: &str, given: &str, family: &str, birth_date: &str, gender: &str) -> Self {
        Self(PatientResource {
            resource_type: "Patient".into(),
            id: Some(id.into()),
            active: Some(true),
            name: vec![HumanName {
                use_type: Some("official".into()),
                given: vec![given.into()],
                family: Some(family.into()),
                ..Default::default()
            }],
            gender: Some(gender.into()),
            birth_date: Some(birth_date.into()),
            ..Default::default()
        })
    }

    fn mrn(mut self, value: &str) -> Self {
        self.0.identifier.push(Identifier {
            type_concept: Some(CodeableConcept {
                coding: vec![coding(IDENTIFIER_TYPE_SYSTEM, "MR", "Medical record number")],
                text: None,
            }),
            value: Some(value.into()),
            ..Default::default()
        });
        self
    }

    fn phone(mut self, value: &str, use_type: &str) -> Self {
        self.0.telecom.push(contact_point("phone", value, use_type));
        self
    }

    fn email(mut self, value: &str) -> Self {
        self.0.telecom.push(contact_point("email", value, "home"));
        self
    }

    fn address(mut self, lines: &[&str], city: &str, state: &str, postal_code: &str) -> Self {
        self.0.address.push(Address {
            use_type: Some("home".into()),
            line: lines.iter().map(|l| l.to_string()).collect(),
            city: Some(city.into()),
            state: Some(state.into()),
            postal_code: Some(postal_code.into()),
            country: Some("USA".into()),
            ..Default::default()
        });
        self
    }

    fn gp(mut self, display: &str) -> Self {
        self.0.general_practitioner.push(Reference {
            reference: Some(format!("Practitioner/{}", display.to_lowercase().replace([' ', '.'], ""))),
            display: Some(display.into()),
        });
        self
    }

    fn contact(mut self, contact: PatientContact) -> Self {
        self.0.contact.push(contact);
        self
    }

    fn marital(mut self, code: &str) -> Self {
        self.0.marital_status = Some(CodeableConcept {
            coding: vec![Coding {
                system: Some("http://terminology.hl7.org/CodeSystem/v3-MaritalStatus".into()),
                code: Some(code.into()),
                display: None,
            }],
            text: None,
        });
        self
    }

    fn build(self) -> PatientResource {
        self.0
    }
}

fn coding(system: &str, code: &str, display: &str) -> Coding {
    Coding {
        system: Some(system.into()),
        code: Some(code.into()),
        display: Some(display.into()),
    }
}

fn contact_point(system: &str, value: &str, use_type: &str) -> ContactPoint {
    ContactPoint {
        system: Some(system.into()),
        value: Some(value.into()),
        use_type: Some(use_type.into()),
        rank: None,
    }
}

fn kin(code: &str, display: &str, given: &str, family: &str, phone: &str) -> PatientContact {
    PatientContact {
        relationship: vec![CodeableConcept {
            coding: vec![coding(RELATIONSHIP_SYSTEM, code, display)],
            text: None,
        }],
        name: Some(HumanName {
            given: vec![given.into()],
            family: Some(family.into()),
            ..Default::default()
        }),
        telecom: vec![contact_point("phone", phone, "home")],
        ..Default::default()
    }
}

fn pharmacy(organization: &str) -> PatientContact {
    PatientContact {
        relationship: vec![CodeableConcept {
            coding: Vec::new(),
            text: Some("Preferred pharmacy".into()),
        }],
        organization: Some(Reference {
            reference: None,
            display: Some(organization.into()),
        }),
        ..Default::default()
    }
}
