//! Shared prompt fragments for the agent stages.

/// FHIR R4 search syntax reference handed to the construction stage.
pub(crate) const SYNTAX_SUMMARY: &str = r#"# Syntax Considerations
## Chaining (Using . in Parameter Names)
Chaining allows searching on properties of referenced resources:

# Observations where the patient's name is "Smith"
GET /Observation?patient.name=Smith

# Observations where the patient has MRN 12345
GET /Observation?patient.identifier=http://hospital.org/mrn|12345

# With type disambiguation (when reference can be multiple types)
GET /Observation?subject:Patient.name=Smith

# Multiple levels of chaining
GET /DiagnosticReport?result.subject.name=Smith

## Combining Parameters (AND vs OR)
AND (intersection): Repeat the parameter or use different parameters
# Patient with given name "John" AND family name "Smith"
GET /Patient?given=John&family=Smith

OR (union): Use comma-separated values
# Patients with given name "John" OR "Jane"
GET /Patient?given=John,Jane

# How to Use Each Type:
1. Number
Searching on a simple numerical value in a resource. Values can include precision (e.g., 100 vs 100.00) and support exponential notation (e.g., 1e2). Supports prefixes: eq, ne, lt, le, gt, ge, sa, eb, ap.
Examples:
* [parameter]=100 — values equal to 100 (within precision)
* [parameter]=lt100 — values less than 100
* [parameter]=ge100 — values greater than or equal to 100
2. Date
A date parameter searches on date/time or period. The format is yyyy-mm-ddThh:mm:ss.ssss[Z|(+|-)hh:mm]. Date searches are intrinsically matches against periods. Supports the same prefixes as number parameters.
Examples:
* [parameter]=eq2013-01-14 — date is January 14, 2013
* [parameter]=ge2013-03-14 — date is on or after March 14, 2013
* [parameter]=lt2013-01-14T10:00 — before 10:00 on January 14, 2013
3. String
For a simple string search, a string parameter serves as input for a search against sequences of characters. This search is insensitive to casing and combining characters like accents. By default, a field matches if the value equals or starts with the supplied parameter value.
Modifiers:
* :contains — matches anywhere in the string
* :exact — case-sensitive exact match
Examples:
* given=eve — matches "Eve", "Evelyn"
* given:contains=eve — matches "Eve", "Evelyn", "Severine"
* given:exact=Eve — matches only "Eve" (case-sensitive)
4. Token
A token type provides a close to exact match search on a string of characters, potentially scoped by a URI. It is mostly used against code or identifier datatypes where the value may have a URI that scopes its meaning. Matches are literal and case sensitive unless the underlying semantics indicate otherwise.
Syntax:
* [parameter]=[code] — matches code regardless of system
* [parameter]=[system]|[code] — matches code within specific system
* [parameter]=|[code] — matches code with no system
* [parameter]=[system]| — matches any code in the system
Modifiers: :text, :not, :above, :below, :in, :not-in, :of-type
Examples:
* identifier=http://acme.org/patient|2345
* gender=male
* code:below=http://snomed.info/sct|235862008 — subsumption search
5. Reference
A reference parameter refers to references between resources. The interpretation is either: [id] (logical id), [type]/[id] (typed logical id), or [url] (absolute URL).
Modifiers: :[type], :identifier, :above, :below
Examples:
* subject=Patient/23
* subject:Patient=23
* subject:identifier=http://example.org/mrn|12345
6. Quantity
A quantity parameter searches on the Quantity datatype. The syntax is [prefix][number]|[system]|[code].
Examples:
* value-quantity=5.4|http://unitsofmeasure.org|mg — 5.4 mg (UCUM)
* value-quantity=5.4||mg — 5.4 mg (any system)
* value-quantity=le5.4|http://unitsofmeasure.org|mg — ≤5.4 mg
7. URI
The uri parameter refers to an element containing a URI. By default, matches are precise, case and accent sensitive, and the entire URI must match. The modifiers :above or :below can be used for partial matching.
Examples:
* url=http://acme.org/fhir/ValueSet/123
* url:below=http://acme.org/fhir — matches URLs starting with this path
8. Composite
Composite search parameters allow joining multiple elements into distinct single values with a $. This allows searches based on tuples of values, which is different from simple intersection.
Examples:
* code-value-quantity=http://loinc.org|2823-3$gt5.4|http://unitsofmeasure.org|mmol/L
* characteristic-value=gender$mixed
9. Special
A few parameters have the type 'special', indicating the way this parameter works is unique to the parameter and described with the parameter. The general modifiers and comparators do not apply except as stated in the description.

Common Prefixes (for number, date, quantity)
eq: Equal (default)
ne: Not equal
gt: Greater than
lt: Less than
ge: Greater than or equal
le: Less than or equal
sa: Starts after
eb: Ends before
ap: Approximately (~10%)

Common Modifiers
:missing (All single-element types): Filter by presence/absence of value
:exact (string): Case-sensitive exact match
:contains (string, uri): Match anywhere in value
:text (token, reference): String match on display text
:not (token): Negation
:above (token, reference, uri): Hierarchical/subsumption search (ancestors)
:below (token, reference, uri): Hierarchical/subsumption search (descendants)
:in (token): Value is in specified ValueSet
:not-in (token): Value is not in specified ValueSet
:identifier (reference): Match on Reference.identifier
:[type] (reference): Restrict reference to specific resource type
:of-type (token): Match identifier by type code and value
"#;
