// CV extraction prompt templates.

pub const CV_EXTRACT_SYSTEM: &str = "\
You are a precise CV data extractor. \
Read the CV text and return the candidate's profile as structured JSON. \
You MUST respond with valid JSON only, with no markdown fences and no explanations. \
Copy values as written in the CV. Never invent employers, dates, grades or skills. \
Use null for anything the CV does not state.";

pub const CV_EXTRACT_PROMPT: &str = r#"Extract the candidate profile from the CV text below.

CV TEXT:
{cv_text}

OUTPUT SCHEMA (return exactly this structure; omit nothing, use null or [] when absent):
{
  "basic_info": {
    "first_name": "string", "middle_name": "string", "last_name": "string",
    "title": "string", "bio": "string",
    "email": "string", "phone": "string", "alternate_phone": "string",
    "date_of_birth": "YYYY-MM-DD", "gender": "male" | "female" | "non_binary" | "other" | "prefer_not_to_say",
    "nationality": "string", "address": "string", "city": "string", "state": "string",
    "country": "string", "postal_code": "string", "location": "string",
    "linkedin_url": "string", "github_url": "string", "portfolio_url": "string",
    "website_url": "string", "twitter_url": "string",
    "current_company": "string", "current_salary": number,
    "expected_salary_min": number, "expected_salary_max": number, "salary_currency": "ISO 4217 code",
    "notice_period_days": number,
    "availability": "immediate" | "two_weeks" | "one_month" | "three_months" | "not_looking",
    "available_from": "YYYY-MM-DD", "total_experience_years": number,
    "work_mode_preference": "remote" | "hybrid" | "onsite",
    "preferred_employment_type": EMPLOYMENT_TYPE,
    "willing_to_relocate": boolean, "open_to_work": boolean,
    "requires_visa_sponsorship": boolean, "visa_status": "string",
    "profile_picture_url": "string"
  },
  "work_experiences": [{
    "title": "string", "company": "string", "employment_type": EMPLOYMENT_TYPE,
    "is_current": boolean, "start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD",
    "location": "string", "description": "string"
  }],
  "educations": [{
    "degree_diploma": "string", "university_school": "string", "field_of_study": "string",
    "is_current": boolean, "start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD",
    "grade": "string", "description": "string"
  }],
  "certificates": [{
    "name": "string", "issuing_authority": "string", "issue_date": "YYYY-MM-DD",
    "expiry_date": "YYYY-MM-DD", "credential_id": "string", "credential_url": "string",
    "description": "string"
  }],
  "projects": [{
    "name": "string", "description": "string", "is_current": boolean,
    "start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD", "role": "string",
    "technologies": ["string"], "project_url": "string"
  }],
  "skills": [{
    "name": "string", "category": "string", "description": "string", "proficiency": 0-100
  }],
  "awards": [{
    "title": "string", "offered_by": "string", "associated_with": "string",
    "date": "YYYY-MM-DD", "description": "string"
  }],
  "volunteering": [{
    "role": "string", "institution": "string", "cause": "string", "is_current": boolean,
    "start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD", "description": "string"
  }],
  "languages": [{
    "language": "string", "is_native": boolean,
    "oral_proficiency": PROFICIENCY, "written_proficiency": PROFICIENCY
  }],
  "accomplishments": [{ "title": "string", "description": "string" }]
}

EMPLOYMENT_TYPE is one of "full_time", "part_time", "contract", "freelance",
"internship", "temporary", "self_employed", "apprenticeship".
PROFICIENCY is one of "elementary", "limited_working", "professional_working",
"full_professional", "native_bilingual".

Dates with only a month use "YYYY-MM"; dates with only a year use "YYYY".
List one skill per entry; do not merge several skills into one name."#;
